use log::error;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Volume of the timer cues in percent.
    pub beep_volume: u8,
    pub theme: Theme,
    pub vibration: bool,
    pub keep_screen_awake: bool,
}

impl Settings {
    #[must_use]
    pub fn current_theme(&self) -> Theme {
        match self.theme {
            Theme::System => {
                if prefers_dark_color_scheme() {
                    Theme::Dark
                } else {
                    Theme::Light
                }
            }
            Theme::Light | Theme::Dark => self.theme,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            beep_volume: 80,
            theme: Theme::System,
            vibration: true,
            keep_screen_awake: true,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    System,
    Light,
    Dark,
}

fn prefers_dark_color_scheme() -> bool {
    let Some(window) = web_sys::window() else {
        error!("failed to access window to determine preferred color scheme");
        return false;
    };
    match window.match_media("(prefers-color-scheme: dark)") {
        Ok(Some(media_query_list)) => media_query_list.matches(),
        Ok(None) => {
            error!("failed to determine preferred color scheme");
            false
        }
        Err(_) => {
            error!("failed to match media to determine preferred color scheme");
            false
        }
    }
}
