#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::Uart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;

use pad_core::ring::ByteRing;
use radio_pad::board::{halt, probe_revision, Power};
use radio_pad::flash::FlashNvm;
use radio_pad::report::{HidReportOut, LocalPeerApply, LocalReport, ReportLatch};
use radio_pad::uart_link::{self, LineMode, LinkTx, RX_RING_SIZE};
use radio_pad::{ConfigStore, DeviceSpec, FrameSender, LinkService, ProfileStore};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// Main-loop tick rate; parsing, report emission, and cache sync all run
/// on this cadence.
const TICK_HZ: u64 = 250;

static RX_RING: StaticCell<ByteRing<RX_RING_SIZE>> = StaticCell::new();

/// Latest locally produced report, signaled by the input pipeline.
static REPORT_SIGNAL: StaticCell<Signal<CriticalSectionRawMutex, LocalReport>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("controller starting");
    let p = embassy_rp::init(Default::default());

    // Board revision straps; an unknown pattern is fatal.
    let strap_a = Input::new(p.PIN_14, Pull::Up);
    let strap_b = Input::new(p.PIN_15, Pull::Up);
    let spec = match probe_revision(&strap_a, &strap_b) {
        Ok(revision) => DeviceSpec::controller(revision),
        Err(unknown) => {
            error!("board revision could not be determined ({})", unknown.0);
            halt();
        }
    };
    info!("board revision {}", spec.revision);

    let mut nvm = FlashNvm::new(p.FLASH);
    let mut config = ConfigStore::new(spec.role);
    if config.init(&mut nvm).is_err() {
        error!("config storage unavailable");
        halt();
    }
    let mut profiles = ProfileStore::new();
    if profiles.load_all(&mut nvm).is_err() {
        error!("profile storage unavailable");
        halt();
    }

    // Radio link: bring the line up in command mode for the module
    // bootstrap, then switch to the framed data rate.
    let mut uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_link::line_config(LineMode::Command),
    );
    uart_link::enter_data_mode(&mut uart);
    let (tx, rx) = uart.split();

    let ring = RX_RING.init(ByteRing::new());
    let (producer, consumer) = ring.split();
    let mut link = LinkService::new(spec, consumer);
    link.reset_rx();
    let mut sender = FrameSender::new(LinkTx::new(tx));

    spawner.must_spawn(uart_link::rx_task(rx, producer));

    let mut power = Power;
    let mut reports = HidReportOut;
    let mut peer = LocalPeerApply;
    let mut latch = ReportLatch::new(REPORT_SIGNAL.init(Signal::new()));

    info!("controller ready");
    let mut ticker = Ticker::every(Duration::from_hz(TICK_HZ));
    loop {
        ticker.next().await;

        if link
            .pump(&mut config, &mut nvm, &mut reports, &mut peer, &mut power)
            .is_err()
        {
            warn!("link: dispatch hit a storage error");
        }

        // Input reports go out every tick regardless of prior delivery;
        // the unacknowledged transport is repaired by repetition.
        let (report_id, data) = latch.latest();
        sender.send_input_report(report_id, &data);

        // Complete any deferred protocol change (notify peer, restart).
        link.flush_pending(&mut sender, &mut power);

        if config.sync(&mut nvm).is_err() {
            warn!("nvm: config sync failed");
        }
        if profiles.sync(&mut nvm).is_err() {
            warn!("nvm: profile sync failed");
        }
    }
}
