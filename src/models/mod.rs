pub mod attempt;
pub mod employee;
pub mod mitra;
pub mod program;
pub mod quiz;
pub mod score_detail;
