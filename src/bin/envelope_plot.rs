use clap::Parser;
use csv::ReaderBuilder;
use plotters::prelude::*;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render an envelope magnitude heatmap from CSV"
)]
struct Cli {
    #[arg(long)]
    input: String,
    #[arg(long, default_value = "artifacts/envelope.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 900)]
    height: u32,
}

#[derive(Debug, Clone)]
struct Cell {
    lon: f64,
    colat: f64,
    magnitude: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (cells, mut lons, mut colats) = read_cells(&cli.input)?;

    if cells.is_empty() {
        return Err(anyhow::anyhow!("No valid samples in the provided CSV"));
    }

    lons.sort_by(|a, b| a.partial_cmp(b).unwrap());
    lons.dedup();
    colats.sort_by(|a, b| a.partial_cmp(b).unwrap());
    colats.dedup();

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);

    let legend_width = 140i32;
    let (plot_area, legend_area) =
        root.split_horizontally((cli.width as i32 - legend_width).max(200));

    let grid = build_grid(&cells, &lons, &colats);
    let mut min_value = f64::INFINITY;
    let mut max_value = f64::NEG_INFINITY;
    let mut max_pos: Option<(usize, usize)> = None;
    for (colat_idx, row) in grid.iter().enumerate() {
        for (lon_idx, &v) in row.iter().enumerate() {
            if v.is_finite() {
                if v > max_value {
                    max_value = v;
                    max_pos = Some((lon_idx, colat_idx));
                }
                if v < min_value {
                    min_value = v;
                }
            }
        }
    }

    let (max_lon_idx, max_colat_idx) =
        max_pos.ok_or_else(|| anyhow::anyhow!("No valid cells in the provided CSV"))?;
    if !min_value.is_finite() {
        min_value = 0.0;
    }
    if max_value <= min_value {
        max_value = min_value + 1e-9;
    }

    let lon_span = lons.last().copied().unwrap_or(0.0);
    let colat_span = colats.last().copied().unwrap_or(0.0);

    {
        let mut chart = ChartBuilder::on(&plot_area)
            .margin(20)
            .caption("Thrust envelope magnitude".to_string(), caption_font)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .build_cartesian_2d(0.0..lon_span, 0.0..colat_span)?;

        chart
            .configure_mesh()
            .x_desc("Longitude (rad)")
            .y_desc("Colatitude from +x (rad)")
            .label_style(label_font.clone())
            .x_labels(7)
            .y_labels(5)
            .x_label_formatter(&|v| format!("{v:.2}"))
            .y_label_formatter(&|v| format!("{v:.2}"))
            .draw()?;

        for (colat_idx, row) in grid.iter().enumerate() {
            let (y0, y1) = cell_bounds(&colats, colat_idx);
            for (lon_idx, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    continue;
                }
                let (x0, x1) = cell_bounds(&lons, lon_idx);
                let t = (value - min_value) / (max_value - min_value);
                let color = jet_color(t);
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x0, y0), (x1, y1)],
                    color.filled(),
                )))?;
            }
        }

        // cross marker on the strongest direction
        let x = lons[max_lon_idx];
        let y = colats[max_colat_idx];
        let marker_color = RGBColor(210, 100, 20);
        let cross_half_width = lon_span * 0.02;
        let cross_half_height = colat_span * 0.02;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - cross_half_width, y), (x + cross_half_width, y)],
            ShapeStyle::from(&marker_color).stroke_width(3),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, y - cross_half_height), (x, y + cross_half_height)],
            ShapeStyle::from(&marker_color).stroke_width(3),
        )))?;
        let text = format!("{max_value:.2} kgf");
        let text_pos = (x + 0.02 * lon_span, y + 0.02 * colat_span);
        chart.draw_series(std::iter::once(Text::new(
            text,
            text_pos,
            label_font.clone().color(&marker_color),
        )))?;
    }

    {
        let mut chart = ChartBuilder::on(&legend_area)
            .margin_left(20)
            .margin_right(20)
            .margin_top(30)
            .margin_bottom(30)
            .x_label_area_size(0)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..1.0, min_value..max_value)?;

        for i in 0..300 {
            let t0 = i as f64 / 300.0;
            let t1 = (i + 1) as f64 / 300.0;
            let v0 = min_value + (max_value - min_value) * t0;
            let v1 = min_value + (max_value - min_value) * t1;
            let color = jet_color(t0);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(0.0, v0), (1.0, v1)],
                color.filled(),
            )))?;
        }

        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(0)
            .y_labels(6)
            .y_desc("Magnitude (kgf)")
            .y_label_style(label_font.clone())
            .axis_desc_style(label_font.clone())
            .y_label_formatter(&|v| format!("{v:.2}"))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

fn read_cells(path: &str) -> anyhow::Result<(Vec<Cell>, Vec<f64>, Vec<f64>)> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("CSV missing '{name}' column"))
    };
    let lon_idx = column("lon_rad")?;
    let colat_idx = column("colat_rad")?;
    let magnitude_idx = column("magnitude_kgf")?;

    let mut cells = Vec::new();
    let mut lons = Vec::new();
    let mut colats = Vec::new();
    for rec in rdr.records() {
        let r = rec?;
        let lon: f64 = r.get(lon_idx).unwrap_or("").parse().unwrap_or(f64::NAN);
        let colat: f64 = r.get(colat_idx).unwrap_or("").parse().unwrap_or(f64::NAN);
        let magnitude: f64 = r
            .get(magnitude_idx)
            .unwrap_or("")
            .parse()
            .unwrap_or(f64::NAN);
        // partial sweeps leave NaN magnitudes behind; keep the axes anyway
        if lon.is_finite() && colat.is_finite() {
            lons.push(lon);
            colats.push(colat);
            if magnitude.is_finite() {
                cells.push(Cell {
                    lon,
                    colat,
                    magnitude,
                });
            }
        }
    }
    Ok((cells, lons, colats))
}

fn build_grid(cells: &[Cell], lons: &[f64], colats: &[f64]) -> Vec<Vec<f64>> {
    let mut grid = vec![vec![f64::NAN; lons.len()]; colats.len()];
    for cell in cells {
        let lon_idx = nearest_index(lons, cell.lon);
        let colat_idx = nearest_index(colats, cell.colat);
        grid[colat_idx][lon_idx] = cell.magnitude;
    }
    grid
}

fn nearest_index(coords: &[f64], value: f64) -> usize {
    coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - value)
                .abs()
                .partial_cmp(&(*b - value).abs())
                .unwrap()
        })
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn cell_bounds(coords: &[f64], idx: usize) -> (f64, f64) {
    let lower = if idx == 0 {
        coords[0]
    } else {
        0.5 * (coords[idx - 1] + coords[idx])
    };
    let upper = if idx + 1 == coords.len() {
        coords[idx]
    } else {
        0.5 * (coords[idx] + coords[idx + 1])
    };
    (lower, upper)
}

fn jet_color(t_in: f64) -> RGBColor {
    let t = t_in.clamp(0.0, 1.0);
    let channel = |v: f64| v.clamp(0.0, 1.0);
    let r = channel(1.5 - 4.0 * (t - 0.75).abs());
    let g = channel(1.5 - 4.0 * (t - 0.5).abs());
    let b = channel(1.5 - 4.0 * (t - 0.25).abs());
    RGBColor((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}
