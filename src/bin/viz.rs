use clap::Parser;
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use glider_sim::dynamics::state::{SimConfig, State};
use glider_sim::sim::{self, Trajectory};
use glider_sim::vehicle::{presets, Scenario, ScenarioConfig};

/// Plot altitude, speed, attitude and ground track of a glider flight.
#[derive(Parser, Debug)]
#[command(name = "glider-viz", version, about)]
#[command(after_help = format!("Presets: {}", presets::NAMES.join(", ")))]
struct Args {
    /// Preset name or path of a JSON scenario file
    #[arg(default_value = "turn")]
    scenario: String,
}

fn load(name: &str) -> Result<(Scenario, SimConfig), Box<dyn std::error::Error>> {
    if let Some(preset) = presets::by_name(name) {
        return Ok((preset?, SimConfig::default()));
    }
    let config = ScenarioConfig::from_file(name)?;
    Ok((config.to_scenario()?, config.sim_config()))
}

fn main() -> eframe::Result {
    let args = Args::parse();
    let run = load(&args.scenario).and_then(|(scenario, config)| {
        let trajectory = sim::simulate(&scenario, &config)?;
        Ok((scenario, trajectory))
    });
    let (scenario, trajectory) = match run {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let app = SimViz { scenario, trajectory };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Glider Flight Simulator", options, Box::new(|_| Ok(Box::new(app))))
}

struct SimViz {
    scenario: Scenario,
    trajectory: Trajectory,
}

fn plot(ui: &mut egui::Ui, id: &str, x_label: &str, size: (f32, f32), lines: Vec<(&str, PlotPoints)>) {
    Plot::new(id)
        .width(size.0)
        .height(size.1)
        .x_axis_label(x_label)
        .legend(egui_plot::Legend::default())
        .show(ui, |plot_ui| {
            for (name, points) in lines {
                plot_ui.line(Line::new(name, points));
            }
        });
}

impl eframe::App for SimViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let states = &self.trajectory.states;
        let step = (states.len() / 2000).max(1);
        let sampled: Vec<&State> = states.iter().step_by(step).collect();
        let series =
            |f: fn(&State) -> [f64; 2]| sampled.iter().map(|&s| f(s)).collect::<PlotPoints>();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Scenario: {}", self.scenario.name));
            let top = states.iter().map(|s| s.altitude()).fold(f64::MIN, f64::max);
            let events: Vec<String> = self
                .trajectory
                .events
                .iter()
                .map(|e| format!("{} @ {:.1} s", e.kind, e.time))
                .collect();
            ui.label(format!(
                "Max altitude: {:.0} m  |  Propulsion: {}  |  Flight: {:.0} s  |  Events: {}",
                top,
                self.scenario.propulsion.kind(),
                states.last().map_or(0.0, |s| s.time),
                if events.is_empty() { "none".to_string() } else { events.join(", ") },
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let size = (available.x / 2.0 - 8.0, available.y / 2.0 - 8.0);

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Altitude (m)");
                    plot(ui, "altitude", "Time (s)", size, vec![(
                        "Altitude",
                        series(|s| [s.time, s.altitude()]),
                    )]);
                });
                ui.vertical(|ui| {
                    ui.label("Speed (m/s)");
                    plot(ui, "speed", "Time (s)", size, vec![(
                        "Speed",
                        series(|s| [s.time, s.velocity()]),
                    )]);
                });
            });

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Attitude (deg)");
                    plot(ui, "attitude", "Time (s)", size, vec![
                        ("Path angle", series(|s| [s.time, s.path_angle().to_degrees()])),
                        ("Alpha", series(|s| [s.time, s.alpha().to_degrees()])),
                        ("Bank", series(|s| [s.time, s.bank().to_degrees()])),
                    ]);
                });
                ui.vertical(|ui| {
                    ui.label("Ground track (m)");
                    plot(ui, "track", "Downrange (m)", size, vec![(
                        "Track",
                        series(|s| [s.downrange(), s.crossrange()]),
                    )]);
                });
            });
        });
    }
}
