#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // Hide console in release mode

#[cfg(not(test))]
use mdview_edit::{MarkdownEditorApp, APP_NAME};
use std::path::PathBuf;

const DEFAULT_WIDTH: f32 = 1100.0;
const DEFAULT_HEIGHT: f32 = 720.0;

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    initial_file: Option<PathBuf>,
    width: Option<f32>,
    height: Option<f32>,
}

#[cfg(not(test))]
fn parse_cli_args() -> Result<CliOptions, String> {
    parse_cli_from(std::env::args().skip(1))
}

fn parse_cli_from<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = CliOptions::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--width" => {
                let value = next_value(&mut iter, "--width")?;
                opts.width = Some(parse_dimension("--width", &value)?);
            }
            "--height" => {
                let value = next_value(&mut iter, "--height")?;
                opts.height = Some(parse_dimension("--height", &value)?);
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {flag}")),
            _ if opts.initial_file.is_none() => opts.initial_file = Some(PathBuf::from(arg)),
            _ => {}
        }
    }

    Ok(opts)
}

fn next_value<I>(iter: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item = String>,
{
    iter.next().ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_dimension(flag: &str, value: &str) -> Result<f32, String> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("Invalid {flag} value: {value}")),
    }
}

/// Application entry point
#[cfg(not(test))]
fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match parse_cli_args() {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let viewport = egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_inner_size(egui::Vec2::new(
            cli.width.unwrap_or(DEFAULT_WIDTH),
            cli.height.unwrap_or(DEFAULT_HEIGHT),
        ))
        .with_min_inner_size(egui::Vec2::new(600.0, 400.0))
        .with_drag_and_drop(true);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let initial_file = cli.initial_file;
    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| {
            configure_egui_style(&cc.egui_ctx);

            let mut app = MarkdownEditorApp::new(&cc.egui_ctx);
            if let Some(file_path) = initial_file {
                if file_path.is_file() {
                    app.open_path(file_path);
                } else {
                    log::warn!("File not found: {}", file_path.display());
                }
            }

            Box::new(app)
        }),
    )
}

#[cfg(test)]
fn main() {}

/// Configure egui styling for side-by-side editing
fn configure_egui_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::Vec2::new(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(8.0);
    style.spacing.menu_margin = egui::Margin::same(6.0);
    style.visuals.window_rounding = egui::Rounding::same(4.0);
    style.visuals.menu_rounding = egui::Rounding::same(4.0);

    ctx.set_style(style);
}
