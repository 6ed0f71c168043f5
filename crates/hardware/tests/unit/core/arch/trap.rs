//! Exception vectoring tests.

use lasim_core::common::Exception;
use lasim_core::core::arch::trap::TrapHandler;

const EENTRY: u64 = 0x1c00_0000;
const TLBRENTRY: u64 = 0x1c00_8000;

#[test]
fn without_spacing_everything_enters_at_eentry() {
    assert_eq!(TrapHandler::vector(&Exception::Syscall, EENTRY, TLBRENTRY, 0), EENTRY);
    assert_eq!(TrapHandler::vector(&Exception::PageModify(0), EENTRY, TLBRENTRY, 0), EENTRY);
}

#[test]
fn spacing_offsets_by_ecode() {
    // SYS is 0xb, slot size 8 bytes
    assert_eq!(TrapHandler::vector(&Exception::Syscall, EENTRY, TLBRENTRY, 1), EENTRY + 0x58);
    // BRK is 0xc, slot size 16 bytes
    assert_eq!(TrapHandler::vector(&Exception::Breakpoint, EENTRY, TLBRENTRY, 2), EENTRY + 0xc0);
}

#[test]
fn refill_always_uses_tlbrentry() {
    let refill = Exception::TlbRefill(0x1234);
    assert_eq!(TrapHandler::vector(&refill, EENTRY, TLBRENTRY, 0), TLBRENTRY);
    assert_eq!(TrapHandler::vector(&refill, EENTRY, TLBRENTRY, 3), TLBRENTRY);
}
