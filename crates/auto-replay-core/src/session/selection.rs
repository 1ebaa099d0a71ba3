/// Query for the host UI's current row selection.
pub trait SelectionSource: Send {
    /// Smallest selected row index, if anything is selected.
    fn min_selected_index(&self) -> Option<usize>;
}

/// Selection source for hosts without a list view.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelection;

impl SelectionSource for NoSelection {
    fn min_selected_index(&self) -> Option<usize> {
        None
    }
}

impl<F> SelectionSource for F
where
    F: Fn() -> Option<usize> + Send,
{
    fn min_selected_index(&self) -> Option<usize> {
        self()
    }
}
