//! End-to-end command handling through [`AppService`].
//!
//! Each test feeds raw MQTT payloads into the service and asserts on the
//! recorded hardware calls and the storage document, the same surface a
//! broker-connected operator would observe.

use roomsense::app::ports::LedPort;
use roomsense::app::service::{AppService, SystemRequest};
use roomsense::config::DeviceConfig;
use roomsense::display::GlyphScale;

use crate::mock_hw::{HwCall, MockHardware, MockStorage};

fn service() -> AppService {
    let mut config = DeviceConfig::default();
    config.myname = "node1".into();
    AppService::new(config, true)
}

fn send(
    app: &mut AppService,
    hw: &mut MockHardware,
    storage: &mut MockStorage,
    payload: &str,
) -> Option<SystemRequest> {
    app.handle_message("node1", payload.as_bytes(), hw, storage)
}

#[test]
fn reboot_is_handed_back_to_the_platform() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    let request = send(&mut app, &mut hw, &mut storage, "reboot");
    assert_eq!(request, Some(SystemRequest::Reboot));
    assert!(hw.calls.is_empty(), "reboot touches no hardware itself");
}

#[test]
fn garbage_payloads_change_nothing() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    assert_eq!(send(&mut app, &mut hw, &mut storage, "frobnicate 1 2"), None);
    assert_eq!(send(&mut app, &mut hw, &mut storage, ""), None);
    assert!(hw.calls.is_empty());
    assert!(storage.document.is_none());
}

#[test]
fn led_command_sets_pixel_and_flushes() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    send(&mut app, &mut hw, &mut storage, "led 10 20 30");

    assert_eq!(
        hw.calls,
        vec![
            HwCall::SetPixel {
                index: 0,
                r: 10,
                g: 20,
                b: 30
            },
            HwCall::Show,
        ]
    );
}

#[test]
fn latched_colour_survives_a_presence_blanking_cycle() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    send(&mut app, &mut hw, &mut storage, "led 10 20 30");

    // Nobody near: strip blanks and the panel dims.
    assert!(!app.presence_update(600, &mut hw));
    assert_eq!(hw.pixel(0), (0, 0, 0));
    assert_eq!(hw.last_contrast(), Some(0));

    // Someone close again: the latched colour comes back.
    assert!(app.presence_update(120, &mut hw));
    assert_eq!(hw.pixel(0), (10, 20, 30));
    assert_eq!(hw.last_contrast(), Some(255));
}

#[test]
fn led_writes_are_not_flushed_while_lights_are_off() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    app.presence_update(600, &mut hw);
    let shows_while_blanking = hw.shows();

    send(&mut app, &mut hw, &mut storage, "led 4 1 2 3");
    assert_eq!(hw.pixel(4), (1, 2, 3), "framebuffer still updates");
    assert_eq!(hw.shows(), shows_while_blanking, "no flush while blanked");
}

#[test]
fn config_set_takes_effect_only_on_write() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    send(&mut app, &mut hw, &mut storage, "config room kitchen");
    send(&mut app, &mut hw, &mut storage, "config site hq");
    assert!(storage.document.is_none(), "set alone must not persist");

    send(&mut app, &mut hw, &mut storage, "config write");
    let persisted = DeviceConfig::load(&storage);
    assert_eq!(persisted.location.room, "kitchen");
    assert_eq!(persisted.location.site, "hq");
    assert_eq!(persisted.myname, "node1");
}

#[test]
fn failed_config_write_is_swallowed() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();
    storage.fail_writes = true;

    send(&mut app, &mut hw, &mut storage, "config room attic");
    let request = send(&mut app, &mut hw, &mut storage, "config write");
    assert_eq!(request, None, "write failure never escalates");
    assert!(storage.document.is_none());
}

#[test]
fn display_text_draws_with_planned_layout() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    send(&mut app, &mut hw, &mut storage, "display hello world");

    assert_eq!(hw.calls[0], HwCall::DisplayClear);
    assert_eq!(
        hw.calls[1],
        HwCall::DrawText {
            col: 0,
            row: 0,
            scale: GlyphScale::Large,
            text: "hello".into()
        }
    );
    assert_eq!(
        hw.calls[2],
        HwCall::DrawText {
            col: 0,
            row: 3,
            scale: GlyphScale::Large,
            text: "world".into()
        }
    );
}

#[test]
fn display_flip_is_picked_up_by_config_write() {
    let mut app = service();
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    send(&mut app, &mut hw, &mut storage, "display flip");
    assert!(hw.calls.contains(&HwCall::SetFlipped(true)));

    send(&mut app, &mut hw, &mut storage, "config write");
    assert!(DeviceConfig::load(&storage).flipped);
}

#[test]
fn display_commands_skip_hardware_when_no_panel_was_found() {
    let mut app = AppService::new(DeviceConfig::default(), false);
    let mut hw = MockHardware::new();
    let mut storage = MockStorage::empty();

    send(&mut app, &mut hw, &mut storage, "display off");
    send(&mut app, &mut hw, &mut storage, "display some text");
    assert!(hw.calls.is_empty());
}

#[test]
fn render_tick_runs_only_with_panel_and_lights() {
    let mut app = service();
    let mut hw = MockHardware::with_environment();

    // Default mode is the temperature readout.
    app.render_tick(50_000, &mut hw);
    assert_eq!(hw.drawn_texts(), ["21.5 C"]);

    // Lights off: the tick is gated entirely.
    app.presence_update(900, &mut hw);
    app.render_tick(200_000, &mut hw);
    assert_eq!(hw.drawn_texts(), ["21.5 C"]);
}

#[test]
fn display_mode_switch_renders_on_next_tick() {
    let mut app = service();
    let mut hw = MockHardware::with_environment();
    let mut storage = MockStorage::empty();

    app.render_tick(40_000, &mut hw);
    send(&mut app, &mut hw, &mut storage, "display humidity");

    // The mode change rearms the timer, so the very next tick renders.
    app.render_tick(41_000, &mut hw);
    assert_eq!(hw.drawn_texts(), ["21.5 C", "48.0 %"]);
}
