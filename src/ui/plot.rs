use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color::ColorMap;
use crate::data::aggregate::{DashboardOutcome, DashboardViews, Group};
use crate::data::model::{display_label, Dataset};
use crate::state::{AppState, Tab};
use crate::ui::format_thousands;

const CHART_HEIGHT: f32 = 320.0;

const EMPTY_HINT: &str =
    "Try widening the year range or selecting more sexes, origins or age groups (Reset filters).";

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the KPI header, headline charts and detail tabs.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV file to explore arrivals  (File → Open…)");
        });
        return;
    };

    ui.heading("Moving to Zurich: a playful data explorer");
    ui.add_space(4.0);

    let Some(DashboardOutcome::Ready(views)) = &state.outcome else {
        ui.label(
            RichText::new("No data for this filter selection.")
                .color(Color32::from_rgb(230, 160, 40))
                .size(16.0),
        );
        ui.label(EMPTY_HINT);
        return;
    };

    let mut tab = state.tab;
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_strip(ui, views);
            ui.add_space(8.0);

            ui.columns(2, |cols| {
                monthly_plot(&mut cols[0], &views.monthly);
                cols[1].strong("Top quarters");
                ranking_table(&mut cols[1], "top_quarters", "Quarter", &views.top_quarters);
            });

            ui.add_space(8.0);
            ui.horizontal(|ui: &mut Ui| {
                ui.selectable_value(&mut tab, Tab::Origin, "By Origin");
                ui.selectable_value(&mut tab, Tab::AgeSex, "By Age & Sex");
                ui.selectable_value(&mut tab, Tab::Districts, "Districts");
            });
            ui.separator();

            match tab {
                Tab::Origin => origin_area(ui, &state.origin_colors, &dataset, views),
                Tab::AgeSex => age_sex_bars(ui, &state.age_colors, &dataset, views),
                Tab::Districts => {
                    ui.strong("Top districts (Kreis)");
                    ranking_table(ui, "top_districts", "District", &views.top_districts);
                }
            }
        });
    state.tab = tab;
}

fn kpi(ui: &mut Ui, title: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(title);
        ui.label(RichText::new(value).size(24.0).strong());
    });
}

fn kpi_strip(ui: &mut Ui, views: &DashboardViews) {
    let peak = match views.peak_year {
        Some((year, count)) => format!("{year} ({})", format_thousands(count)),
        None => "-".to_string(),
    };
    ui.horizontal(|ui: &mut Ui| {
        kpi(ui, "Total recorded moves (filtered)", format_thousands(views.total));
        ui.add_space(24.0);
        kpi(ui, "Peak year", peak);
        ui.add_space(24.0);
        kpi(ui, "Foreign share", format!("{:.1}%", views.foreign_share()));
        ui.add_space(24.0);
        kpi(
            ui,
            "Active quarters",
            format_thousands(views.active_quarters as u64),
        );
    });
}

// ---------------------------------------------------------------------------
// Monthly arrivals
// ---------------------------------------------------------------------------

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn date_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn monthly_plot(ui: &mut Ui, monthly: &[Group<Option<NaiveDate>>]) {
    ui.strong("Monthly arrivals (count)");

    // Undated records have no position on a time axis.
    let points: PlotPoints = monthly
        .iter()
        .filter_map(|g| g.key.map(|d| [day_number(d), g.count as f64]))
        .collect();

    Plot::new("monthly_plot")
        .height(CHART_HEIGHT)
        .x_axis_formatter(|mark, _range| date_label(mark.value))
        .label_formatter(|_name, point| {
            format!("{}\n{} moves", date_label(point.x), format_thousands(point.y as u64))
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Arrivals")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Ranking tables
// ---------------------------------------------------------------------------

fn ranking_table(ui: &mut Ui, id: &str, label: &str, rows: &[Group<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::remainder().at_least(120.0))
            .column(Column::auto().at_least(80.0))
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong(label);
                });
                header.col(|ui| {
                    ui.strong("Moves");
                });
            })
            .body(|mut body| {
                for g in rows {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(display_label(&g.key));
                        });
                        row.col(|ui| {
                            ui.label(format_thousands(g.count));
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Arrivals by origin over years (stacked area)
// ---------------------------------------------------------------------------

fn origin_area(ui: &mut Ui, colors: &ColorMap, dataset: &Dataset, views: &DashboardViews) {
    ui.strong("Arrivals by origin over years");

    let years: BTreeSet<i32> = views.origin_by_year.iter().map(|g| g.key.0).collect();
    let sums: HashMap<(i32, &str), u64> = views
        .origin_by_year
        .iter()
        .map(|g| ((g.key.0, g.key.1.as_str()), g.count))
        .collect();
    let origins: Vec<&String> = dataset
        .options
        .origins
        .iter()
        .filter(|o| years.iter().any(|&y| sums.contains_key(&(y, o.as_str()))))
        .collect();

    // Each origin's line sits on the running total of the ones before it.
    let mut running: HashMap<i32, u64> = HashMap::new();
    let mut layers: Vec<Line> = Vec::with_capacity(origins.len());
    for origin in origins {
        let points: PlotPoints = years
            .iter()
            .map(|&y| {
                let top = running.entry(y).or_default();
                *top += sums.get(&(y, origin.as_str())).copied().unwrap_or(0);
                [y as f64, *top as f64]
            })
            .collect();
        layers.push(
            Line::new(points)
                .name(display_label(origin))
                .color(colors.color_for(origin))
                .fill(0.0),
        );
    }

    Plot::new("origin_area")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // Topmost layer first so lower layers paint over it.
            for line in layers.into_iter().rev() {
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Arrivals by age group and sex (one facet per sex)
// ---------------------------------------------------------------------------

fn age_sex_bars(ui: &mut Ui, colors: &ColorMap, dataset: &Dataset, views: &DashboardViews) {
    ui.strong("Arrivals by age group and sex");

    let sums: HashMap<(i32, &str, &str), u64> = views
        .age_sex_year
        .iter()
        .map(|g| ((g.key.0, g.key.1.as_str(), g.key.2.as_str()), g.count))
        .collect();
    let years: BTreeSet<i32> = views.age_sex_year.iter().map(|g| g.key.0).collect();
    let sexes: Vec<&String> = dataset
        .options
        .sexes
        .iter()
        .filter(|s| views.age_sex_year.iter().any(|g| &g.key.2 == *s))
        .collect();
    let ages: Vec<&String> = dataset
        .options
        .age_groups
        .iter()
        .filter(|a| views.age_sex_year.iter().any(|g| &g.key.1 == *a))
        .collect();

    if sexes.is_empty() {
        return;
    }

    ui.columns(sexes.len(), |cols| {
        for (col, sex) in cols.iter_mut().zip(&sexes) {
            col.label(RichText::new(display_label(sex)).strong());

            let mut charts: Vec<BarChart> = Vec::with_capacity(ages.len());
            for age in &ages {
                let bars: Vec<Bar> = years
                    .iter()
                    .map(|&y| {
                        let v = sums
                            .get(&(y, age.as_str(), sex.as_str()))
                            .copied()
                            .unwrap_or(0);
                        Bar::new(y as f64, v as f64).width(0.7)
                    })
                    .collect();
                let below: Vec<&BarChart> = charts.iter().collect();
                let chart = BarChart::new(bars)
                    .name(display_label(age))
                    .color(colors.color_for(age))
                    .stack_on(&below);
                charts.push(chart);
            }

            Plot::new(("age_sex", sex.as_str()))
                .height(CHART_HEIGHT)
                .legend(Legend::default())
                .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
                .allow_scroll(false)
                .show(col, |plot_ui| {
                    for chart in charts {
                        plot_ui.bar_chart(chart);
                    }
                });
        }
    });
}
