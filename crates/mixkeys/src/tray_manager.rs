//! System tray icon and the mixer menu.
//!
//! The menu is rebuilt from the [`MixerView`] whenever displayed state
//! changes. Menu item ids encode the command they trigger, so the async side
//! can turn a `MenuEvent` back into an [`AppCommand`] without sharing state
//! with the UI thread.

use crate::{AppCommand, AppError, AppResult, TrayIconState};

use mixkeys_core::{
    ApplicationIdentity, GlobalSettings, HOTKEY_VOLUME_STEP, MixerView, VolumeCommand,
};

use std::panic::Location;

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};
use tray_icon::menu::{
    CheckMenuItem, IsMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu,
};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const TOOLTIP_IDLE: &str = "Mixkeys";
const ICON_SIZE: u32 = 32;
const PRESET_LEVELS: [i32; 5] = [0, 25, 50, 75, 100];

const ID_REFRESH: &str = "refresh";
const ID_REMEMBER: &str = "remember";
const ID_AUTOSTART: &str = "autostart";
const ID_RELOAD: &str = "reload";
const ID_OPEN_CONFIG: &str = "open-config";
const ID_EXIT: &str = "exit";

const KIND_MUTE: &str = "mute";
const KIND_UP: &str = "up";
const KIND_DOWN: &str = "down";
const KIND_SET_PREFIX: &str = "set-";
const KIND_RESTORE: &str = "restore";
const KIND_HOTKEYS: &str = "hotkeys";

fn app_item_id(kind: &str, app: &ApplicationIdentity) -> MenuId {
    MenuId::new(format!("{kind}:{app}"))
}

/// Map a menu item id back to the command it stands for.
pub(crate) fn menu_command(id: &MenuId) -> Option<AppCommand> {
    let id = id.0.as_str();

    match id {
        ID_REFRESH => return Some(AppCommand::Refresh),
        ID_REMEMBER => return Some(AppCommand::ToggleRemember),
        ID_AUTOSTART => return Some(AppCommand::ToggleAutostart),
        ID_RELOAD => return Some(AppCommand::ReloadConfig),
        ID_OPEN_CONFIG => return Some(AppCommand::OpenConfig),
        ID_EXIT => return Some(AppCommand::Shutdown),
        _ => {}
    }

    let (kind, app) = id.split_once(':')?;
    if app.is_empty() {
        return None;
    }
    let app = ApplicationIdentity::new(app);

    let command = match kind {
        KIND_MUTE => VolumeCommand::ToggleMute,
        KIND_UP => VolumeCommand::Adjust(HOTKEY_VOLUME_STEP),
        KIND_DOWN => VolumeCommand::Adjust(-HOTKEY_VOLUME_STEP),
        KIND_RESTORE => return Some(AppCommand::Restore { app }),
        KIND_HOTKEYS => return Some(AppCommand::CaptureHotkeys { app }),
        _ => {
            let level = kind.strip_prefix(KIND_SET_PREFIX)?.parse().ok()?;
            VolumeCommand::Set(level)
        }
    };

    Some(AppCommand::Volume { app, command })
}

#[track_caller]
fn menu_error(what: &str, e: impl std::fmt::Display) -> AppError {
    AppError::TrayError {
        reason: format!("Failed to add {what}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    settings: GlobalSettings,
    audio_available: bool,
}

impl TrayManager {
    /// Create the tray icon with an empty mixer menu.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let settings = GlobalSettings::default();
        let menu = build_menu(&MixerView::new(), settings, true)?;
        let icon = Self::load_icon(TrayIconState::Idle)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(TOOLTIP_IDLE)
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            settings,
            audio_available: true,
        })
    }

    /// Remember settings for the next [`TrayManager::render`].
    pub fn set_settings(&mut self, settings: GlobalSettings) {
        self.settings = settings;
    }

    /// Mark the audio backend as unavailable for the next render.
    pub fn set_audio_available(&mut self, available: bool) {
        self.audio_available = available;
    }

    /// Rebuild the menu from the current view.
    #[track_caller]
    #[instrument(skip_all, fields(apps = view.list_applications().len()))]
    pub fn render(&mut self, view: &MixerView) -> AppResult<()> {
        let menu = build_menu(view, self.settings, self.audio_available)?;
        self.tray_icon.set_menu(Some(Box::new(menu)));
        debug!("Tray menu rebuilt");
        Ok(())
    }

    /// Switch icon and tooltip.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState, tooltip: Option<&str>) -> AppResult<()> {
        let icon = Self::load_icon(state)?;

        self.tray_icon
            .set_icon(Some(icon))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(tooltip.unwrap_or(TOOLTIP_IDLE)))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    /// Draw the icon: a speaker glyph, white when idle, amber while capturing.
    #[track_caller]
    fn load_icon(state: TrayIconState) -> AppResult<Icon> {
        let glyph = match state {
            TrayIconState::Idle => Rgba([255, 255, 255, 255]),
            TrayIconState::Capturing => Rgba([255, 176, 0, 255]),
        };

        let rgba = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
            let dy = y.abs_diff(ICON_SIZE / 2);
            let body = (6..12).contains(&x) && dy <= 5;
            let cone = (12..20).contains(&x) && dy <= 5 + (x - 12);
            let wave = (23..26).contains(&x) && dy <= 9;
            if body || cone || wave {
                glyph
            } else {
                Rgba([0, 0, 0, 0])
            }
        });

        let (width, height) = (rgba.width(), rgba.height());

        Icon::from_rgba(rgba.into_raw(), width, height).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

#[track_caller]
fn build_menu(view: &MixerView, settings: GlobalSettings, audio_available: bool) -> AppResult<Menu> {
    let menu = Menu::new();

    if !audio_available {
        let item = MenuItem::new("Audio sessions unavailable", false, None);
        menu.append(&item).map_err(|e| menu_error("status item", e))?;
    } else if view.list_applications().is_empty() {
        let item = MenuItem::new("No applications playing audio", false, None);
        menu.append(&item).map_err(|e| menu_error("status item", e))?;
    }

    for app in view.list_applications() {
        let submenu = app_submenu(view, app)?;
        menu.append(&submenu).map_err(|e| menu_error("application menu", e))?;
    }

    let separator = PredefinedMenuItem::separator();
    let refresh = MenuItem::with_id(ID_REFRESH, "Refresh apps", audio_available, None);
    let remember = CheckMenuItem::with_id(
        ID_REMEMBER,
        "Remember volumes & mute state",
        true,
        settings.remember_volumes,
        None,
    );
    let autostart = CheckMenuItem::with_id(ID_AUTOSTART, "Start at login", true, settings.auto_start, None);
    let reload = MenuItem::with_id(ID_RELOAD, "Reload config", true, None);
    let open_config = MenuItem::with_id(ID_OPEN_CONFIG, "Open config file", true, None);
    let exit_separator = PredefinedMenuItem::separator();
    let exit = MenuItem::with_id(ID_EXIT, "Exit", true, None);

    let items: [&dyn IsMenuItem; 8] = [
        &separator,
        &refresh,
        &remember,
        &autostart,
        &reload,
        &open_config,
        &exit_separator,
        &exit,
    ];
    menu.append_items(&items).map_err(|e| menu_error("menu items", e))?;

    Ok(menu)
}

#[track_caller]
fn app_submenu(view: &MixerView, app: &ApplicationIdentity) -> AppResult<Submenu> {
    let state = view.displayed(app).cloned().unwrap_or_default();

    let title = if state.muted {
        format!("{app}  {}% (muted)", state.volume)
    } else {
        format!("{app}  {}%", state.volume)
    };
    let submenu = Submenu::new(title, true);

    let mute = MenuItem::with_id(app_item_id(KIND_MUTE, app), state.mute_label(), true, None);
    let up = MenuItem::with_id(app_item_id(KIND_UP, app), "Volume +10", true, None);
    let down = MenuItem::with_id(app_item_id(KIND_DOWN, app), "Volume -10", true, None);

    let levels = Submenu::new("Set volume", true);
    for level in PRESET_LEVELS {
        let item = MenuItem::with_id(
            app_item_id(&format!("{KIND_SET_PREFIX}{level}"), app),
            format!("{level}%"),
            true,
            None,
        );
        levels.append(&item).map_err(|e| menu_error("volume preset", e))?;
    }

    let restore = MenuItem::with_id(app_item_id(KIND_RESTORE, app), "Restore remembered volume", true, None);
    let hotkeys = MenuItem::with_id(app_item_id(KIND_HOTKEYS, app), "Set hotkeys...", true, None);

    let items: [&dyn IsMenuItem; 6] = [&mute, &up, &down, &levels, &restore, &hotkeys];
    submenu.append_items(&items).map_err(|e| menu_error("application items", e))?;

    if let Some(label) = &state.hotkeys {
        let separator = PredefinedMenuItem::separator();
        let label = MenuItem::new(label, false, None);
        let items: [&dyn IsMenuItem; 2] = [&separator, &label];
        submenu
            .append_items(&items)
            .map_err(|e| menu_error("hotkey label", e))?;
    }

    Ok(submenu)
}
