mod collision;
mod grading;
