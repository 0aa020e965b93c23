//! Browser implementations of the timer capabilities.
//!
//! Every capability quietly does nothing if the browser lacks the required
//! API or the user disabled it in the settings.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use fitcheck_domain as domain;
use js_sys::{Array, Function, Promise, Reflect};
use log::{error, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::Settings;

pub struct Beeper {
    audio_context: Option<web_sys::AudioContext>,
    volume: u8,
}

impl Beeper {
    #[must_use]
    pub fn new(volume: u8) -> Self {
        Self {
            audio_context: match web_sys::AudioContext::new() {
                Ok(audio_context) => Some(audio_context),
                Err(err) => {
                    error!("failed to create audio context: {err:?}");
                    None
                }
            },
            volume,
        }
    }
}

impl domain::Tone for Beeper {
    fn play_tone(&mut self, frequency: f32, duration_ms: u32) -> Result<(), String> {
        let Some(audio_context) = &self.audio_context else {
            return Ok(());
        };
        if self.volume == 0 {
            return Ok(());
        }
        play_beep(
            audio_context,
            frequency,
            audio_context.current_time(),
            f64::from(duration_ms) / 1000.,
            self.volume,
        )
        .map_err(|err| format!("{err:?}"))
    }
}

fn play_beep(
    audio_context: &web_sys::AudioContext,
    frequency: f32,
    start: f64,
    length: f64,
    volume: u8,
) -> Result<(), JsValue> {
    let oscillator = audio_context.create_oscillator()?;
    let gain = audio_context.create_gain()?;
    gain.gain().set_value(f32::from(volume) / 100.);
    gain.connect_with_audio_node(&audio_context.destination())?;
    oscillator.connect_with_audio_node(&gain)?;
    oscillator.frequency().set_value(frequency);
    oscillator.start_with_when(start)?;
    oscillator.stop_with_when(start + length)?;
    Ok(())
}

pub struct Vibrator {
    enabled: bool,
}

impl Vibrator {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl domain::Haptics for Vibrator {
    fn vibrate(&mut self, pattern: &[u32]) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        let Some(navigator) = navigator_with("vibrate") else {
            return Ok(());
        };
        let pattern = pattern
            .iter()
            .map(|ms| JsValue::from(*ms))
            .collect::<Array>();
        if navigator.vibrate_with_pattern(&pattern) {
            Ok(())
        } else {
            Err("vibration request was rejected".to_string())
        }
    }
}

/// Keeps the display awake using the Screen Wake Lock API.
#[derive(Clone)]
pub struct ScreenWakeLock {
    enabled: bool,
    requested: Rc<Cell<bool>>,
    sentinel: Rc<RefCell<Option<JsValue>>>,
}

impl ScreenWakeLock {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            requested: Rc::new(Cell::new(false)),
            sentinel: Rc::new(RefCell::new(None)),
        }
    }
}

impl domain::WakeLock for ScreenWakeLock {
    fn acquire(&mut self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        let Some(navigator) = navigator_with("wakeLock") else {
            return Ok(());
        };
        let promise = request_wake_lock(&navigator).map_err(|err| format!("{err:?}"))?;

        self.requested.set(true);
        let requested = self.requested.clone();
        let sentinel = self.sentinel.clone();
        spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(value) => {
                    if requested.get() {
                        *sentinel.borrow_mut() = Some(value);
                    } else {
                        release_sentinel(&value);
                    }
                }
                Err(err) => warn!("failed to acquire screen wake lock: {err:?}"),
            }
        });

        Ok(())
    }

    fn release(&mut self) -> Result<(), String> {
        self.requested.set(false);
        if let Some(sentinel) = self.sentinel.borrow_mut().take() {
            release_sentinel(&sentinel);
        }
        Ok(())
    }
}

fn request_wake_lock(navigator: &web_sys::Navigator) -> Result<Promise, JsValue> {
    let wake_lock = Reflect::get(navigator, &JsValue::from_str("wakeLock"))?;
    let request = Reflect::get(&wake_lock, &JsValue::from_str("request"))?.dyn_into::<Function>()?;
    request
        .call1(&wake_lock, &JsValue::from_str("screen"))?
        .dyn_into::<Promise>()
}

fn release_sentinel(sentinel: &JsValue) {
    let result = Reflect::get(sentinel, &JsValue::from_str("release"))
        .and_then(|release| release.dyn_into::<Function>().map_err(JsValue::from))
        .and_then(|release| release.call0(sentinel))
        .and_then(|promise| promise.dyn_into::<Promise>().map_err(JsValue::from));
    match result {
        Ok(promise) => spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                warn!("failed to release screen wake lock: {err:?}");
            }
        }),
        Err(err) => warn!("failed to release screen wake lock: {err:?}"),
    }
}

fn navigator_with(property: &str) -> Option<web_sys::Navigator> {
    let navigator = web_sys::window()?.navigator();
    Reflect::has(&navigator, &JsValue::from_str(property))
        .unwrap_or(false)
        .then_some(navigator)
}

/// Create an engine using the browser capabilities configured by `settings`.
#[must_use]
pub fn engine(protocol: domain::TimerProtocol, settings: &Settings) -> domain::TimerEngine {
    domain::TimerEngine::new(protocol)
        .with_tone(Beeper::new(settings.beep_volume))
        .with_haptics(Vibrator::new(settings.vibration))
        .with_wake_lock(ScreenWakeLock::new(settings.keep_screen_awake))
}
