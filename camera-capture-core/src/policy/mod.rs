pub mod orientation_mirror;
