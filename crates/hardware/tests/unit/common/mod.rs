/// Virtual and physical address arithmetic.
pub mod address_arithmetic;
