pub mod health;
pub mod relation_tuples;
