mod action;
mod record;
