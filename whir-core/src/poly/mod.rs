pub mod eq_poly;
pub mod multilinear;
pub mod unipoly;
