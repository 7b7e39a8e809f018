//! ItemHub cellular hub — main entry point.
//!
//! Hexagonal architecture: the duty-cycle loop wires platform adapters
//! to the workflow service and runs one cloud cycle per wake.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  Bc26Uart        MonotonicClock   HubPins    TimerSleep  │
//! │  (SerialPort)    (Clock)          (PinPort)  (SleepPort) │
//! │                                                          │
//! │  ───────────────── Port Trait Boundary ────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │             HubService (pure logic)                │  │
//! │  │  provision · authenticate · heartbeat ·            │  │
//! │  │  switch sync · sensor push · sleep                 │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use log::{info, warn};

    use itemhub::adapters::{Bc26Uart, HubPins, MonotonicClock, TimerSleep};
    use itemhub::app::{HubService, NetContext};
    use itemhub::config::HubConfig;
    use itemhub::pins::{Pin, PinBank};

    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::prelude::Peripherals;
    use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
    use esp_idf_hal::units::Hertz;

    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ItemHub v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── Configuration ─────────────────────────────────────────
    let mut config = HubConfig::default();
    if let Some(id) = option_env!("ITEMHUB_CLIENT_ID") {
        config.client_id = id.into();
    }
    if let Some(secret) = option_env!("ITEMHUB_CLIENT_SECRET") {
        config.client_secret = secret.into();
    }
    if config.client_id.is_empty() {
        warn!("no client id baked in, token exchange will be rejected");
    }

    // ── BC26 UART link ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let uart_config = UartConfig::new().baudrate(Hertz(config.modem.baud));
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio16,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;

    // ── Wiring ────────────────────────────────────────────────
    let ca_cert = include_str!("../certs/ca.pem");
    let mut service = HubService::new(
        Bc26Uart::new(uart),
        MonotonicClock::new(),
        config.modem.clone(),
    );
    let mut gpio = HubPins::new();
    let mut sleeper = TimerSleep::new();
    let mut ctx = NetContext::default();

    let mut bank = PinBank::new(vec![
        Pin::switch(2, "D2"),
        Pin::switch(5, "D5"),
        Pin::sensor(4, "A0"),
    ]);

    // ── Duty cycle ────────────────────────────────────────────
    // The modem is powered down at the end of every cycle, so each wake
    // starts with a full provision pass.
    loop {
        let mut attempts = 0;
        let provisioned = loop {
            match service.provision(ca_cert.as_bytes(), &mut ctx) {
                Ok(()) => break true,
                Err(e) => {
                    attempts += 1;
                    warn!("provision attempt {attempts} failed: {e}");
                    if attempts >= config.reprovision_threshold {
                        break false;
                    }
                }
            }
        };

        if provisioned {
            run_cycle(&mut service, &config, &mut bank, &mut gpio, &mut ctx);
        } else {
            warn!("provisioning exhausted, sleeping until next wake");
        }

        if let Err(e) = service.shutdown_and_sleep(config.sleep_secs, &mut sleeper, &mut ctx) {
            warn!("power-down failed: {e}");
        }
    }
}

/// One cloud pass: authenticate if needed, then heartbeat, switch sync
/// and sensor push.
#[cfg(target_os = "espidf")]
fn run_cycle<S, C>(
    service: &mut itemhub::app::HubService<S, C>,
    config: &itemhub::config::HubConfig,
    bank: &mut itemhub::pins::PinBank,
    gpio: &mut itemhub::adapters::HubPins,
    ctx: &mut itemhub::app::NetContext,
) where
    S: itemhub::app::SerialPort,
    C: itemhub::app::Clock,
{
    use itemhub::pins::PinMode;
    use log::{info, warn};

    if !ctx.creds.is_authenticated() {
        let auth = service.authenticate(
            &config.api_host,
            config.api_port,
            &config.auth_body(),
            ctx,
        );
        if auth.is_empty() {
            warn!("token exchange failed, skipping this cycle");
            return;
        }
        info!("authenticated as device {}", auth.device_id);
        ctx.creds.token = auth.token;
        ctx.creds.device_id = auth.device_id;
    }

    match service.heartbeat(&config.api_host, config.api_port, ctx) {
        Ok(resp) => info!("heartbeat: {}", resp.status),
        Err(e) => warn!("heartbeat failed: {e}"),
    }
    if !ctx.creds.is_authenticated() {
        return;
    }

    if !service.sync_switch_state(&config.api_host, config.api_port, bank, gpio, ctx) {
        warn!("switch sync failed");
    }
    if !ctx.creds.is_authenticated() {
        return;
    }

    // Digital sensor sampling; the cloud stores whatever text lands in
    // `Pin::value`.
    for pin in bank.iter_mut() {
        if pin.mode == PinMode::Sensor {
            let level = unsafe { esp_idf_svc::sys::gpio_get_level(i32::from(pin.gpio)) };
            pin.value = level.to_string();
        }
    }
    if !service.push_sensor_readings(&config.api_host, config.api_port, bank, ctx) {
        warn!("sensor push incomplete");
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("itemhub targets ESP-IDF; build with --target riscv32imc-esp-espidf --features espidf");
}
