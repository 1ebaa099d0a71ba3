mod action;
