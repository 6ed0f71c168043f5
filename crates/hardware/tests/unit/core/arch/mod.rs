/// CSR table and storage.
pub mod csr;

/// Vector register file and the scalar FP view.
pub mod fpr;



/// Exception vectoring.
pub mod trap;
