//! siogauge - GBA serial receive gauge
//!
//! Receives one byte at a time on the link port (normal mode, clocked by
//! the sender) and shows the latest value as a number and a bar.
//!
//! The SIO completion interrupt records the byte and re-arms; the main
//! loop only ever redraws. A desynchronised link is fatal: the panic
//! handler logs the fault and paints it on screen.

#![no_std]
#![no_main]

#[macro_use]
mod log;

use core::fmt::Write;
use core::panic::PanicInfo;
use core::ptr::addr_of_mut;

use gba::prelude::*;
use heapless::String;

use siogauge_core::SerialLink;
use siogauge_display::{render_fault, FrameBuffer, Presenter};
use siogauge_hal::{Interrupt, IrqMask};
use siogauge_hal_gba::{GbaInterrupts, GbaVideo, MmioSio, VideoAddresses, VramTarget, HANDLERS};

/// The link, shared with the SIO interrupt
// SAFETY: running on a GBA
static LINK: SerialLink<MmioSio> = SerialLink::new(unsafe { MmioSio::gba() });

/// Back buffer; too large for IWRAM
#[link_section = ".ewram"]
static mut BACK_BUFFER: FrameBuffer = FrameBuffer::new();

#[no_mangle]
extern "C" fn main() -> ! {
    info!("siogauge starting");

    RUST_IRQ_HANDLER.write(Some(irq_handler));

    // SAFETY: the only reference ever taken to BACK_BUFFER; GBA hardware
    let mut video = unsafe { GbaVideo::gba(&mut *addr_of_mut!(BACK_BUFFER)) };
    let mut presenter = Presenter::new(&LINK);
    if let Err(e) = presenter.init(&mut video) {
        panic!("display init failed: {:?}", e);
    }

    // SAFETY: GBA hardware, single controller
    let mut irq = unsafe { GbaInterrupts::gba() };
    if let Err(e) = LINK.begin(&mut irq) {
        panic!("link start failed: {}", e);
    }
    if let Err(e) = LINK.arm_next_read() {
        panic!("link arm failed: {}", e);
    }
    info!("listening on link port");

    let mut linked = false;
    loop {
        if let Err(e) = presenter.render_frame(&mut video) {
            warn!("frame dropped: {:?}", e);
        }

        if !linked {
            let stats = LINK.stats();
            if stats.has_data() {
                info!("link established, first value {}", stats.value);
                linked = true;
            }
        }
    }
}

/// Runtime IRQ entry; IF is already acknowledged
extern "C" fn irq_handler(bits: IrqBits) {
    let mut pending = IrqMask::empty();
    if bits.serial() {
        pending = pending.with(Interrupt::Serial);
    }

    if let Err(fault) = HANDLERS.dispatch(pending) {
        panic!("{}", fault);
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    let mut message: String<256> = String::new();
    let _ = write!(message, "{}", info.message());

    fatal!("{}", message);
    if let Some(location) = info.location() {
        fatal!("at {}:{}", location.file(), location.line());
    }

    // SAFETY: GBA hardware; nothing draws after this
    let mut screen = unsafe { VramTarget::new(VideoAddresses::GBA) };
    let _ = render_fault(&mut screen, &message);

    loop {}
}
