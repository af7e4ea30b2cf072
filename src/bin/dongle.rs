#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::Uart;
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;

use pad_core::ring::ByteRing;
use radio_pad::board::{halt, probe_revision, Power};
use radio_pad::flash::FlashNvm;
use radio_pad::report::{HidReportOut, HostPeerRelay};
use radio_pad::uart_link::{self, LineMode, LinkTx, RX_RING_SIZE};
use radio_pad::{ConfigStore, DeviceSpec, FrameSender, LinkService};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

const TICK_HZ: u64 = 250;

static RX_RING: StaticCell<ByteRing<RX_RING_SIZE>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("dongle starting");
    let p = embassy_rp::init(Default::default());

    let strap_a = Input::new(p.PIN_14, Pull::Up);
    let strap_b = Input::new(p.PIN_15, Pull::Up);
    let spec = match probe_revision(&strap_a, &strap_b) {
        Ok(revision) => DeviceSpec::bridge(revision),
        Err(unknown) => {
            error!("board revision could not be determined ({})", unknown.0);
            halt();
        }
    };

    // The bridge mirrors the shared configuration but stores no profiles.
    let mut nvm = FlashNvm::new(p.FLASH);
    let mut config = ConfigStore::new(spec.role);
    if config.init(&mut nvm).is_err() {
        error!("config storage unavailable");
        halt();
    }

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
    let mut peer = HostPeerRelay;

    info!("dongle ready");
    let mut ticker = Ticker::every(Duration::from_hz(TICK_HZ));
    loop {
        ticker.next().await;

        if link
            .pump(&mut config, &mut nvm, &mut reports, &mut peer, &mut power)
            .is_err()
        {
            warn!("link: dispatch hit a storage error");
        }

        // A protocol change on the bridge restarts inline from dispatch;
        // flush_pending only matters on the controller but is harmless.
        link.flush_pending(&mut sender, &mut power);

        if config.sync(&mut nvm).is_err() {
            warn!("nvm: config sync failed");
        }
    }
}
