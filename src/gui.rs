use crate::config::Config;
use crate::game_launcher::{is_valid_nickname, LaunchResult, MAX_RAM_GB, MIN_RAM_GB};
use crate::installer::InstallResult;
use crate::particles::ParticleField;
use crate::settings::PersistedSettings;
use crate::status::{self, Activity, StatusMessage, StatusSender, Workflow};
use crate::tasks::AppContext;
use crate::utils;
use anyhow::Result;
use eframe::egui;
use poll_promise::Promise;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::info;

const GREEN: egui::Color32 = egui::Color32::from_rgb(76, 175, 80);
const RED: egui::Color32 = egui::Color32::from_rgb(255, 87, 51);
const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(46, 46, 46);
const PANEL: egui::Color32 = egui::Color32::from_rgba_premultiplied(48, 48, 48, 204);
const FRAME_TIME: Duration = Duration::from_millis(30);
const SIDEBAR_WIDTH: f32 = 300.0;
const LAUNCH_LABEL: &str = "Start Minecraft (Offline)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Menu,
    Launcher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogKind {
    Information,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Dialog {
    kind: DialogKind,
    title: String,
    message: String,
}

pub struct GrcraftApp {
    context: AppContext,
    status_rx: Receiver<StatusMessage>,
    app_status: StatusSender,
    settings_path: PathBuf,
    mods_dir: PathBuf,
    page: Page,
    nickname: String,
    ram_gb: u32,
    latest_status: Option<StatusMessage>,
    show_settings: bool,
    install: Option<Promise<InstallResult>>,
    install_state: InstallState,
    launch: Option<Promise<LaunchResult>>,
    dialog: Option<Dialog>,
    particles: ParticleField,
    last_tick: Instant,
    shut_down: bool,
}

impl GrcraftApp {
    pub fn new(config: &Config) -> Self {
        let (tx, rx) = status::channel(Workflow::Application);
        let context = AppContext::from_config(config, tx);
        Self::with_context(context, rx, config.paths.settings_file.clone(), config.mods_directory())
    }

    fn with_context(
        context: AppContext,
        status_rx: Receiver<StatusMessage>,
        settings_path: PathBuf,
        mods_dir: PathBuf,
    ) -> Self {
        let app_status = context.status.for_workflow(Workflow::Application);
        let settings = PersistedSettings::load_or_default(&settings_path, &app_status);

        Self {
            context,
            status_rx,
            app_status,
            settings_path,
            mods_dir,
            page: Page::Menu,
            nickname: settings.last_nickname,
            ram_gb: settings.last_ram_gb,
            latest_status: None,
            show_settings: false,
            install: None,
            install_state: InstallState::NotStarted,
            launch: None,
            dialog: None,
            particles: ParticleField::default(),
            last_tick: Instant::now(),
            shut_down: false,
        }
    }

    fn current_settings(&self) -> PersistedSettings {
        PersistedSettings {
            last_nickname: self.nickname.trim().to_string(),
            last_ram_gb: self.ram_gb,
        }
    }

    fn save_settings(&self) {
        self.current_settings()
            .save_reporting(&self.settings_path, &self.app_status);
    }

    /// Everything outside the result window is inert while it is shown.
    fn controls_enabled(&self) -> bool {
        self.dialog.is_none()
    }

    fn can_launch(&self) -> bool {
        is_valid_nickname(self.nickname.trim())
            && self.install_state == InstallState::Succeeded
            && self.launch.is_none()
    }

    fn start_install(&mut self) {
        if self.install.is_some() {
            return;
        }
        self.install = Some(self.context.spawn_install());
        self.install_state = InstallState::Running;
    }

    fn start_launch(&mut self) {
        let nickname = self.nickname.trim().to_string();
        if !is_valid_nickname(&nickname) {
            self.app_status
                .emit("Error: Nickname must be between 3 and 16 characters.");
            self.dialog = Some(Dialog {
                kind: DialogKind::Error,
                title: "Error".to_string(),
                message: "Please enter a valid nickname (3-16 characters).".to_string(),
            });
            return;
        }

        let request = self.context.launch_request(&nickname, self.ram_gb);
        self.launch = Some(self.context.spawn_launch(request));
    }

    fn on_install_finished(&mut self, result: InstallResult) {
        if result.success {
            self.install_state = InstallState::Succeeded;
            self.app_status
                .emit("Library installation finished. Ready to start the game.");
        } else {
            self.install_state = InstallState::Failed;
            self.app_status.emit(format!(
                "Critical error installing libraries: {}",
                result.error_message
            ));
            self.dialog = Some(Dialog {
                kind: DialogKind::Error,
                title: "Error".to_string(),
                message: format!("Critical failure installing libraries: {}", result.error_message),
            });
        }
    }

    fn on_launch_finished(&mut self, result: LaunchResult) {
        if result.success {
            self.app_status.emit(format!(
                "Minecraft started successfully as {}!",
                result.nickname
            ));
            self.dialog = Some(Dialog {
                kind: DialogKind::Information,
                title: "Success".to_string(),
                message: result.message,
            });
        } else {
            self.app_status
                .emit(format!("Failed to start Minecraft: {}", result.message));
            self.dialog = Some(Dialog {
                kind: DialogKind::Error,
                title: "Error".to_string(),
                message: result.message,
            });
        }
    }

    /// Takes whatever the background tasks have produced since the last frame.
    fn poll_tasks(&mut self) {
        if let Some(promise) = self.install.take() {
            match promise.try_take() {
                Ok(result) => self.on_install_finished(result),
                Err(pending) => self.install = Some(pending),
            }
        }
        if let Some(promise) = self.launch.take() {
            match promise.try_take() {
                Ok(result) => self.on_launch_finished(result),
                Err(pending) => self.launch = Some(pending),
            }
        }
        if let Some(last) = status::drain(&self.status_rx).pop() {
            self.latest_status = Some(last);
        }
    }

    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.save_settings();

        if self.install.is_some() || self.launch.is_some() {
            info!("Waiting for background tasks to finish");
        }
        if let Some(promise) = self.install.take() {
            promise.block_until_ready();
        }
        if let Some(promise) = self.launch.take() {
            promise.block_until_ready();
        }
    }

    fn advance_particles(&mut self, width: f32, height: f32) {
        let elapsed = self.last_tick.elapsed();
        let steps = (elapsed.as_millis() / FRAME_TIME.as_millis()).min(10) as u32;
        for _ in 0..steps {
            self.particles.tick(width, height);
        }
        if steps > 0 {
            self.last_tick = Instant::now();
        }
    }

    fn paint_particles(&self, painter: &egui::Painter, rect: egui::Rect) {
        for p in self.particles.particles() {
            let [r, g, b] = p.rgb;
            let alpha = p.alpha.clamp(0, 255) as u8;
            painter.circle_filled(
                egui::pos2(rect.min.x + p.x, rect.min.y + p.y),
                p.size / 2.0,
                egui::Color32::from_rgba_unmultiplied(r, g, b, alpha),
            );
        }
    }

    fn grcraft_theme(&self) -> egui::Visuals {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = BACKGROUND;
        visuals.window_fill = egui::Color32::from_rgb(60, 60, 60);
        visuals.selection.bg_fill = GREEN;
        visuals.widgets.hovered.weak_bg_fill = egui::Color32::from_rgb(69, 160, 73);
        visuals.widgets.active.weak_bg_fill = egui::Color32::from_rgb(62, 142, 65);
        visuals.widgets.inactive.weak_bg_fill = GREEN;
        visuals
    }

    fn show_menu(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            egui::Frame::none()
                .fill(egui::Color32::from_black_alpha(153))
                .rounding(15.0)
                .inner_margin(20.0)
                .show(ui, |ui| {
                    ui.label(egui::RichText::new("GRcraft").size(36.0).strong().color(GREEN));
                });
            ui.add_space(40.0);

            let start = egui::Button::new(egui::RichText::new("Start GRcraft").size(24.0).strong())
                .min_size(egui::vec2(280.0, 56.0))
                .rounding(10.0);
            if ui.add(start).clicked() {
                self.page = Page::Launcher;
                self.start_install();
            }
        });
    }

    fn show_launcher(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(egui::RichText::new("⚙").size(24.0)).clicked() {
                    self.show_settings = !self.show_settings;
                }
                if ui.button(egui::RichText::new("Open mods folder").size(18.0)).clicked() {
                    utils::open_mods_folder(&self.mods_dir, &self.app_status);
                }
            });
        });

        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            egui::Frame::none()
                .fill(egui::Color32::from_black_alpha(128))
                .rounding(5.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new("Minecraft Offline Launcher")
                            .size(28.0)
                            .strong()
                            .color(GREEN),
                    );
                });
        });
        ui.add_space(20.0);

        egui::Frame::none()
            .fill(PANEL)
            .rounding(10.0)
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(85)))
            .inner_margin(20.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Nickname:").size(16.0));
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.nickname)
                            .hint_text("Enter your nickname (3-16 characters)")
                            .desired_width(f32::INFINITY),
                    );
                    let border = if utils::nickname_hint(self.nickname.trim()).is_none() {
                        GREEN
                    } else {
                        RED
                    };
                    ui.painter()
                        .rect_stroke(response.rect, 5.0, egui::Stroke::new(1.0, border));
                });
                ui.add_space(10.0);

                let label = if self.launch.is_some() { "Launching..." } else { LAUNCH_LABEL };
                let button = egui::Button::new(egui::RichText::new(label).size(18.0).strong())
                    .min_size(egui::vec2(ui.available_width(), 44.0))
                    .rounding(8.0);
                if ui.add_enabled(self.can_launch(), button).clicked() {
                    self.start_launch();
                }

                if self.install_state == InstallState::Failed
                    && ui.button("Retry library installation").clicked()
                {
                    self.start_install();
                }
            });
        ui.add_space(15.0);

        let (fraction, text, animate) = match &self.latest_status {
            None => (0.0, "Waiting...".to_string(), false),
            Some(message) => match message.activity() {
                Activity::InProgress => {
                    let t = ui.input(|i| i.time) as f32;
                    ((t * 1.5).sin() * 0.5 + 0.5, message.display_line(), true)
                }
                Activity::Idle => (1.0, message.display_line(), false),
            },
        };
        ui.add(
            egui::ProgressBar::new(fraction)
                .text(text)
                .animate(animate)
                .desired_height(25.0),
        );
    }

    fn show_settings_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("settings_sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .frame(
                egui::Frame::none()
                    .fill(egui::Color32::from_rgba_premultiplied(40, 40, 40, 230))
                    .stroke(egui::Stroke::new(2.0, GREEN))
                    .inner_margin(15.0),
            )
            .show(ctx, |ui| {
                let enabled = self.controls_enabled();
                ui.add_enabled_ui(enabled, |ui| self.settings_contents(ui));
            });
    }

    fn settings_contents(&mut self, ui: &mut egui::Ui) {
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            if ui.button("X").clicked() {
                self.show_settings = false;
            }
        });
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("Settings").size(22.0).strong().color(GREEN));
        });
        ui.add_space(15.0);

        ui.label(egui::RichText::new("RAM allocation:").size(16.0));
        let slider = egui::Slider::new(&mut self.ram_gb, MIN_RAM_GB..=MAX_RAM_GB)
            .step_by(1.0)
            .suffix(" GB");
        if ui.add(slider).changed() {
            self.save_settings();
        }
        ui.label(egui::RichText::new(format!("{} GB", self.ram_gb)).size(15.0).strong());
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.dialog else {
            return;
        };
        let color = match dialog.kind {
            DialogKind::Information => GREEN,
            DialogKind::Error => RED,
        };

        let mut dismissed = false;
        egui::Window::new(egui::RichText::new(&dialog.title).color(color))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&dialog.message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.dialog = None;
        }
    }
}

impl eframe::App for GrcraftApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.grcraft_theme());
        self.poll_tasks();

        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
            return;
        }

        if self.show_settings && self.page == Page::Launcher {
            self.show_settings_sidebar(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND).inner_margin(20.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.advance_particles(rect.width(), rect.height());
                self.paint_particles(ui.painter(), rect);

                let enabled = self.controls_enabled();
                ui.add_enabled_ui(enabled, |ui| match self.page {
                    Page::Menu => self.show_menu(ui),
                    Page::Launcher => self.show_launcher(ui),
                });
            });

        self.show_dialog(ctx);
        ctx.request_repaint_after(FRAME_TIME);
    }
}

pub fn run_gui(config: Config) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_resizable(false)
            .with_title("GRcraft Offline Launcher"),
        ..Default::default()
    };

    eframe::run_native(
        "GRcraft Offline Launcher",
        options,
        Box::new(move |_cc| Ok(Box::new(GrcraftApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run GUI: {}", e))
}
