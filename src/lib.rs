//! Multi-task feedforward network predicting a student's continuous
//! score and pass probability from four study features.

pub mod multitask;

#[cfg(feature = "python_ffi")]
pub mod python_ffi;
