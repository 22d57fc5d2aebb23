/// One centimetre in PDF points.
pub const CM: f32 = 72.0 / 2.54;

pub type Rgb = [u8; 3];

/// Build an RGB triple from a `0xRRGGBB` literal.
pub const fn rgb(hex: u32) -> Rgb {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Justify,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Regular,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];

    pub fn new(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>, // None = black
    /// Forced line break; `text` is ignored.
    pub line_break: bool,
}

impl Run {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            bold: false,
            italic: false,
            color: None,
            line_break: false,
        }
    }

    pub fn line_break(font_size: f32) -> Self {
        Self {
            line_break: true,
            ..Self::new("", font_size)
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn style(&self) -> FontStyle {
        FontStyle::new(self.bold, self.italic)
    }
}

#[derive(Clone, Debug)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub indent_left: f32,
    pub bullet: Option<String>,
    pub bullet_indent: f32,
    pub keep_with_next: bool,
}

#[cfg(test)]
impl Paragraph {
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|r| if r.line_break { "\n" } else { r.text.as_str() })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellVAlign {
    Top,
    Middle,
}

#[derive(Clone, Debug)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    pub drawing: Option<Drawing>,
    pub shading: Option<Rgb>,
    pub grid_span: u16,
    pub v_align: CellVAlign,
}

impl TableCell {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            drawing: None,
            shading: None,
            grid_span: 1,
            v_align: CellVAlign::Middle,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn drawing(drawing: Drawing) -> Self {
        Self {
            drawing: Some(drawing),
            ..Self::empty()
        }
    }
}

#[cfg(test)]
impl TableCell {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Clone, Debug)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Do not separate this row from the following one across a page break.
    pub keep_with_next: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct CellPadding {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Default for CellPadding {
    fn default() -> Self {
        Self {
            top: 3.0,
            left: 6.0,
            bottom: 3.0,
            right: 6.0,
        }
    }
}

impl CellPadding {
    pub fn uniform(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            left: horizontal,
            bottom: vertical,
            right: horizontal,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GridLines {
    pub width: f32,
    pub color: Rgb,
}

#[derive(Clone, Debug)]
pub struct Table {
    pub col_widths: Vec<f32>, // points
    pub rows: Vec<TableRow>,
    pub padding: CellPadding,
    pub grid: Option<GridLines>,
    pub h_align: Alignment,
    /// Leading rows repeated at the top of every continuation page.
    pub header_rows: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Clone, Debug)]
pub struct EmbeddedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub display_width: f32,  // points
    pub display_height: f32, // points
}

#[derive(Clone, Debug)]
pub struct Gauge {
    pub value: f64,
}

#[derive(Clone, Debug)]
pub struct TrafficLight {
    pub current: f64,
    pub red_below: f64,
    pub yellow_below: f64,
    pub unit: String,
    pub border: bool,
}

#[derive(Clone, Debug)]
pub struct BarChart {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    pub value_max: f64,
    pub value_step: f64,
    pub target: Option<f64>,
    pub bar_color: Rgb,
}

#[derive(Clone, Debug)]
pub struct RadarChart {
    pub values: Vec<f64>,
    pub labels: Vec<String>,
    pub value_max: f64,
    pub fill: Rgb,
    pub fill_alpha: f32,
    pub stroke: Rgb,
}

#[derive(Clone, Debug)]
pub enum Widget {
    Gauge(Gauge),
    TrafficLight(TrafficLight),
    BarChart(BarChart),
    Radar(RadarChart),
}

/// A fixed-size vector drawing placed in the flow.
#[derive(Clone, Debug)]
pub struct Drawing {
    pub widget: Widget,
    pub width: f32,
    pub height: f32,
    pub alignment: Alignment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageTemplate {
    Cover,
    Title,
    Institution,
    /// Content pages carrying the running header and footer.
    Body,
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub thickness: f32,
    pub color: Rgb,
    pub space_before: f32,
    pub space_after: f32,
}

#[derive(Clone, Debug)]
pub enum Block {
    Paragraph(Paragraph),
    Spacer(f32),
    PageBreak,
    /// Template used by pages started after this point.
    NextTemplate(PageTemplate),
    Rule(Rule),
    Image {
        image: EmbeddedImage,
        alignment: Alignment,
    },
    Drawing(Drawing),
    Table(Table),
}

#[derive(Clone, Debug, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub keywords: String,
}

/// Text drawn on every `Body` page.
#[derive(Clone, Debug)]
pub struct RunningText {
    pub header_left: String,
    pub header_right: String,
    pub header_color: Rgb,
    pub header_rule_color: Rgb,
    pub footer_lines: Vec<String>,
    pub footer_center: String,
    pub footer_color: Rgb,
    pub footer_rule_color: Rgb,
    /// Prefix of the page number, e.g. "Página".
    pub page_label: String,
}

#[derive(Clone, Copy, Debug)]
pub struct PageSetup {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl PageSetup {
    pub fn a4() -> Self {
        Self {
            page_width: 595.2756,
            page_height: 841.8898,
            margin_top: 2.2 * CM,
            margin_bottom: 2.0 * CM,
            margin_left: 2.0 * CM,
            margin_right: 2.0 * CM,
        }
    }

    pub fn frame_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    pub fn frame_top(&self) -> f32 {
        self.page_height - self.margin_top
    }
}

pub struct Document {
    pub page: PageSetup,
    pub info: DocumentInfo,
    pub running: Option<RunningText>,
    pub blocks: Vec<Block>,
}

impl Document {
    /// Visit every piece of text that will be drawn with a font, including widget labels.
    pub fn for_each_text(&self, mut f: impl FnMut(FontStyle, &str)) {
        fn visit_paragraph(p: &Paragraph, f: &mut impl FnMut(FontStyle, &str)) {
            for run in &p.runs {
                f(run.style(), &run.text);
            }
            if let Some(bullet) = &p.bullet {
                f(FontStyle::Regular, bullet);
            }
        }
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => visit_paragraph(p, &mut f),
                Block::Drawing(d) => d.widget.for_each_label(&mut f),
                Block::Table(t) => {
                    for cell in t.rows.iter().flat_map(|r| r.cells.iter()) {
                        for p in &cell.paragraphs {
                            visit_paragraph(p, &mut f);
                        }
                        if let Some(d) = &cell.drawing {
                            d.widget.for_each_label(&mut f);
                        }
                    }
                }
                _ => {}
            }
        }
        if let Some(running) = &self.running {
            f(FontStyle::Regular, &running.header_left);
            f(FontStyle::Regular, &running.header_right);
            f(FontStyle::Regular, &running.footer_center);
            for line in &running.footer_lines {
                f(FontStyle::Regular, line);
            }
            f(FontStyle::Bold, &running.page_label);
        }
    }
}
