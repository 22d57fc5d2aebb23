//! Vector widgets: gauge, traffic light, horizontal bar chart and radar chart.
//!
//! Every widget draws inside its own box whose bottom-left corner is passed in
//! by the caller; all geometry below is relative to that corner.

use std::f32::consts::PI;

use pdf_writer::{Content, Name};

use super::layout::{Anchor, draw_text};
use crate::fonts::FontSet;
use crate::model::{
    BarChart, CM, Drawing, FontStyle, Gauge, RadarChart, Rgb, TrafficLight, Widget, rgb,
};

const RED: Rgb = rgb(0xF44336);
const YELLOW: Rgb = rgb(0xFFC107);
const GREEN: Rgb = rgb(0x4CAF50);
const LIGHT_GREY: Rgb = rgb(0xD3D3D3);
const GREY: Rgb = rgb(0x808080);
const BLACK: Rgb = rgb(0x000000);
const WHITE: Rgb = rgb(0xFFFFFF);

const LIGHT_RED: Rgb = rgb(0xE53935);
const LIGHT_YELLOW: Rgb = rgb(0xFDD835);
const LIGHT_GREEN: Rgb = rgb(0x43A047);
const CURRENT_RING: Rgb = rgb(0x6A1B9A);
const VALUE_TEXT: Rgb = rgb(0x111111);
const MUTED_TEXT: Rgb = rgb(0x666666);
const CARD_BORDER: Rgb = rgb(0xE0E0E0);

/// Name of the graphics state resource that applies a fill alpha.
pub(super) fn alpha_state_name(alpha: f32) -> String {
    format!("GA{}", (alpha.clamp(0.0, 1.0) * 100.0).round() as u32)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum LightState {
    Red,
    Yellow,
    Green,
}

impl TrafficLight {
    pub(crate) fn state(&self) -> LightState {
        if self.current < self.red_below {
            LightState::Red
        } else if self.current < self.yellow_below {
            LightState::Yellow
        } else {
            LightState::Green
        }
    }

    fn value_label(&self) -> String {
        format!("{}{}", self.current.trunc() as i64, self.unit)
    }

    fn legend_lines(&self) -> [String; 3] {
        let red = format_threshold(self.red_below);
        let yellow = format_threshold(self.yellow_below);
        let yellow_top = format_threshold(self.yellow_below - 1.0);
        [
            format!("• Alto  ≥ {yellow}"),
            format!("• Medio {red}–{yellow_top}"),
            format!("• Bajo  < {red}"),
        ]
    }
}

fn format_threshold(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v:.1}")
    }
}

impl Gauge {
    fn clamped(&self) -> f64 {
        self.value.clamp(0.0, 100.0)
    }

    fn value_label(&self) -> String {
        format!("{:.1}%", self.value)
    }
}

impl BarChart {
    fn bar_label(v: f64) -> String {
        format!("{v:.1}%")
    }

    fn axis_ticks(&self) -> Vec<f64> {
        if self.value_step <= 0.0 {
            return vec![0.0, self.value_max];
        }
        let count = (self.value_max / self.value_step).floor() as usize;
        (0..=count).map(|i| i as f64 * self.value_step).collect()
    }
}

impl Widget {
    /// Every string this widget will draw, with the font style used for it.
    pub(crate) fn for_each_label(&self, f: &mut impl FnMut(FontStyle, &str)) {
        match self {
            Widget::Gauge(g) => {
                f(FontStyle::Regular, "0% 100%");
                f(FontStyle::Bold, &g.value_label());
            }
            Widget::TrafficLight(tl) => {
                f(FontStyle::Regular, "Alto Medio Bajo");
                f(FontStyle::Bold, "Niveles:");
                f(FontStyle::Bold, &tl.value_label());
                for line in tl.legend_lines() {
                    f(FontStyle::Regular, &line);
                }
            }
            Widget::BarChart(c) => {
                for label in &c.labels {
                    f(FontStyle::Regular, label);
                }
                for v in &c.values {
                    f(FontStyle::Regular, &BarChart::bar_label(*v));
                }
                for t in c.axis_ticks() {
                    f(FontStyle::Regular, &format_threshold(t));
                }
            }
            Widget::Radar(r) => {
                for label in &r.labels {
                    f(FontStyle::Regular, label);
                }
            }
        }
    }
}

pub(super) fn draw_widget(
    content: &mut Content,
    fonts: &FontSet,
    drawing: &Drawing,
    x: f32,
    y: f32,
) {
    content.save_state();
    match &drawing.widget {
        Widget::Gauge(g) => draw_gauge(content, fonts, g, x, y),
        Widget::TrafficLight(tl) => {
            draw_traffic_light(content, fonts, tl, x, y, drawing.width, drawing.height)
        }
        Widget::BarChart(c) => draw_bar_chart(content, fonts, c, x, y),
        Widget::Radar(r) => draw_radar(content, fonts, r, x, y, drawing.width, drawing.height),
    }
    content.restore_state();
}

fn set_fill(content: &mut Content, [r, g, b]: Rgb) {
    content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

fn set_stroke(content: &mut Content, [r, g, b]: Rgb) {
    content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

/// Append an arc to the current path as cubic Béziers of at most 90° each.
/// Angles in degrees, counter-clockwise from the positive x axis.
fn arc_to(content: &mut Content, cx: f32, cy: f32, r: f32, from_deg: f32, to_deg: f32) {
    let total = to_deg - from_deg;
    let segments = (total.abs() / 90.0).ceil().max(1.0) as usize;
    let step = total / segments as f32;
    for i in 0..segments {
        let a0 = (from_deg + step * i as f32) * PI / 180.0;
        let a1 = (from_deg + step * (i + 1) as f32) * PI / 180.0;
        let k = 4.0 / 3.0 * ((a1 - a0) / 4.0).tan();
        let (s0, c0) = a0.sin_cos();
        let (s1, c1) = a1.sin_cos();
        content.cubic_to(
            cx + r * (c0 - k * s0),
            cy + r * (s0 + k * c0),
            cx + r * (c1 + k * s1),
            cy + r * (s1 - k * c1),
            cx + r * c1,
            cy + r * s1,
        );
    }
}

fn circle_path(content: &mut Content, cx: f32, cy: f32, r: f32) {
    content.move_to(cx + r, cy);
    arc_to(content, cx, cy, r, 0.0, 360.0);
    content.close_path();
}

fn wedge(content: &mut Content, cx: f32, cy: f32, r: f32, from_deg: f32, to_deg: f32, fill: Rgb) {
    let a0 = from_deg * PI / 180.0;
    set_fill(content, fill);
    content.move_to(cx, cy);
    content.line_to(cx + r * a0.cos(), cy + r * a0.sin());
    arc_to(content, cx, cy, r, from_deg, to_deg);
    content.close_path();
    content.fill_nonzero();
}

fn draw_gauge(content: &mut Content, fonts: &FontSet, g: &Gauge, x: f32, y: f32) {
    let cx = x + 5.0 * CM;
    let cy = y + 1.5 * CM;
    let radius = 4.0 * CM;

    // 0-50 red, 50-80 yellow, 80-100 green; 0% sits at 180°.
    wedge(content, cx, cy, radius, 90.0, 180.0, RED);
    wedge(content, cx, cy, radius, 36.0, 90.0, YELLOW);
    wedge(content, cx, cy, radius, 0.0, 36.0, GREEN);

    set_fill(content, WHITE);
    set_stroke(content, LIGHT_GREY);
    content.set_line_width(1.0);
    circle_path(content, cx, cy, radius * 0.7);
    content.fill_nonzero_and_stroke();

    let angle = (180.0 - g.clamped() as f32 / 100.0 * 180.0) * PI / 180.0;
    set_stroke(content, BLACK);
    content.set_line_width(2.0);
    content.move_to(cx, cy);
    content.line_to(cx + radius * 0.9 * angle.cos(), cy + radius * 0.9 * angle.sin());
    content.stroke();

    set_fill(content, BLACK);
    circle_path(content, cx, cy, 5.0);
    content.fill_nonzero();

    draw_text(content, fonts, FontStyle::Regular, 10.0, Some(GREY), cx - radius - 10.0, cy, Anchor::End, "0%");
    draw_text(content, fonts, FontStyle::Regular, 10.0, Some(GREY), cx + radius + 10.0, cy, Anchor::Start, "100%");
    draw_text(
        content,
        fonts,
        FontStyle::Bold,
        18.0,
        None,
        cx,
        cy - 1.0 * CM,
        Anchor::Middle,
        &g.value_label(),
    );
}

fn draw_traffic_light(
    content: &mut Content,
    fonts: &FontSet,
    tl: &TrafficLight,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
) {
    if tl.border {
        set_fill(content, WHITE);
        set_stroke(content, CARD_BORDER);
        content.set_line_width(1.0);
        content.rect(x, y, w, h);
        content.fill_nonzero_and_stroke();
    }

    let pad = 0.8 * CM;
    let col_w = 3.0 * CM;
    let left_h = h - 2.0 * pad;

    let r = (0.40 * CM).min(left_h / 9.0);
    let gap = (0.35 * CM).max((left_h - 6.0 * r) / 2.0);
    let cx = x + pad + 0.9 * CM;
    let lab_x = cx + r + 0.30 * CM;

    let cy_top = y + pad + left_h - r;
    let cy_middle = cy_top - (2.0 * r + gap);
    let cy_bottom = cy_middle - (2.0 * r + gap);

    for (cy, color) in [
        (cy_top, LIGHT_GREEN),
        (cy_middle, LIGHT_YELLOW),
        (cy_bottom, LIGHT_RED),
    ] {
        set_fill(content, color);
        circle_path(content, cx, cy, r);
        content.fill_nonzero();
    }

    for (cy, label) in [(cy_top, "Alto"), (cy_middle, "Medio"), (cy_bottom, "Bajo")] {
        draw_text(content, fonts, FontStyle::Regular, 8.0, Some(MUTED_TEXT), lab_x, cy - 3.0, Anchor::Start, label);
    }

    let ring_cy = match tl.state() {
        LightState::Green => cy_top,
        LightState::Yellow => cy_middle,
        LightState::Red => cy_bottom,
    };
    set_stroke(content, CURRENT_RING);
    content.set_line_width(3.0);
    circle_path(content, cx, ring_cy, r + 0.16 * CM);
    content.stroke();

    let right_x = x + pad + col_w + 0.8 * CM;
    draw_text(
        content,
        fonts,
        FontStyle::Bold,
        30.0,
        Some(VALUE_TEXT),
        right_x,
        y + h - 1.4 * CM,
        Anchor::Start,
        &tl.value_label(),
    );

    let base_y = y + h - 2.4 * CM;
    draw_text(content, fonts, FontStyle::Bold, 8.0, Some(MUTED_TEXT), right_x, base_y, Anchor::Start, "Niveles:");
    for (i, line) in tl.legend_lines().iter().enumerate() {
        let ly = base_y - 0.45 * CM * (i + 1) as f32;
        draw_text(content, fonts, FontStyle::Regular, 8.0, Some(MUTED_TEXT), right_x, ly, Anchor::Start, line);
    }
}

fn draw_bar_chart(content: &mut Content, fonts: &FontSet, c: &BarChart, x: f32, y: f32) {
    let plot_x = x + 110.0;
    let plot_y = y + 50.0;
    let plot_w = 10.0 * CM;
    let plot_h = 9.0 * CM;
    let value_max = c.value_max.max(1.0);
    let to_x = |v: f64| plot_x + (v.clamp(0.0, value_max) / value_max) as f32 * plot_w;

    let n = c.values.len().max(1);
    let band = plot_h / n as f32;
    let bar_h = band * 7.0 / 15.0;

    // First category at the top
    for (i, &v) in c.values.iter().enumerate() {
        let band_top = plot_y + plot_h - band * i as f32;
        let center = band_top - band / 2.0;
        set_fill(content, c.bar_color);
        content.rect(plot_x, center - bar_h / 2.0, to_x(v) - plot_x, bar_h);
        content.fill_nonzero();

        draw_text(
            content,
            fonts,
            FontStyle::Regular,
            7.0,
            None,
            to_x(v) + 7.0,
            center - 2.5,
            Anchor::Start,
            &BarChart::bar_label(v),
        );
        if let Some(label) = c.labels.get(i) {
            draw_text(content, fonts, FontStyle::Regular, 8.0, None, plot_x - 5.0, center - 3.0, Anchor::End, label);
        }
    }

    set_stroke(content, BLACK);
    content.set_line_width(1.0);
    content.move_to(plot_x, plot_y);
    content.line_to(plot_x, plot_y + plot_h);
    content.move_to(plot_x, plot_y);
    content.line_to(plot_x + plot_w, plot_y);
    for t in c.axis_ticks() {
        let tx = to_x(t);
        content.move_to(tx, plot_y);
        content.line_to(tx, plot_y - 4.0);
    }
    content.stroke();
    for t in c.axis_ticks() {
        draw_text(
            content,
            fonts,
            FontStyle::Regular,
            8.0,
            None,
            to_x(t),
            plot_y - 13.0,
            Anchor::Middle,
            &format_threshold(t),
        );
    }

    if let Some(target) = c.target {
        let tx = to_x(target);
        content.save_state();
        set_stroke(content, rgb(0xFF0000));
        content.set_line_width(1.0);
        content.set_dash_pattern([3.0, 1.0], 0.0);
        content.move_to(tx, plot_y);
        content.line_to(tx, plot_y + plot_h);
        content.stroke();
        content.restore_state();
    }
}

fn draw_radar(
    content: &mut Content,
    fonts: &FontSet,
    r: &RadarChart,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
) {
    let n = r.values.len();
    if n < 3 {
        return;
    }
    let cx = x + w / 2.0;
    let cy = y + h / 2.0;
    let radius = (w.min(h) / 2.0 - 3.0 * CM).max(1.0 * CM);
    let value_max = r.value_max.max(1.0);

    // Clockwise from twelve o'clock
    let angle = |i: usize| (90.0 - 360.0 * i as f32 / n as f32) * PI / 180.0;
    let point = |i: usize, frac: f32| {
        let a = angle(i);
        (cx + radius * frac * a.cos(), cy + radius * frac * a.sin())
    };

    set_stroke(content, LIGHT_GREY);
    content.set_line_width(0.5);
    for ring in 1..=5 {
        let frac = ring as f32 / 5.0;
        let (sx, sy) = point(0, frac);
        content.move_to(sx, sy);
        for i in 1..n {
            let (px, py) = point(i, frac);
            content.line_to(px, py);
        }
        content.close_path();
    }
    for i in 0..n {
        let (px, py) = point(i, 1.0);
        content.move_to(cx, cy);
        content.line_to(px, py);
    }
    content.stroke();

    let frac_of = |v: f64| (v.clamp(0.0, value_max) / value_max) as f32;
    let trace = |content: &mut Content| {
        let (sx, sy) = point(0, frac_of(r.values[0]));
        content.move_to(sx, sy);
        for (i, &v) in r.values.iter().enumerate().skip(1) {
            let (px, py) = point(i, frac_of(v));
            content.line_to(px, py);
        }
        content.close_path();
    };

    content.save_state();
    content.set_parameters(Name(alpha_state_name(r.fill_alpha).as_bytes()));
    set_fill(content, r.fill);
    trace(content);
    content.fill_nonzero();
    content.restore_state();

    set_stroke(content, r.stroke);
    content.set_line_width(2.0);
    trace(content);
    content.stroke();

    for (i, label) in r.labels.iter().enumerate().take(n) {
        let a = angle(i);
        let (lx, ly) = (cx + (radius + 10.0) * a.cos(), cy + (radius + 10.0) * a.sin());
        let anchor = if a.cos() > 0.1 {
            Anchor::Start
        } else if a.cos() < -0.1 {
            Anchor::End
        } else {
            Anchor::Middle
        };
        let baseline = if a.sin() > 0.5 {
            ly
        } else if a.sin() < -0.5 {
            ly - 8.0
        } else {
            ly - 3.0
        };
        draw_text(content, fonts, FontStyle::Regular, 8.0, None, lx, baseline, anchor, label);
    }
}
