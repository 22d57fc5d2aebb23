mod layout;
mod table;
mod widgets;

use std::collections::{BTreeSet, HashMap, HashSet};

use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};

use crate::error::Error;
use crate::fonts::{FontSet, register_font};
use crate::model::{
    Alignment, Block, CM, Document, EmbeddedImage, FontStyle, ImageFormat, PageSetup,
    PageTemplate, Paragraph, Rule, RunningText, Widget,
};

use layout::{
    Anchor, build_paragraph_lines, draw_text, first_font_size, is_text_empty, line_pitch,
    render_paragraph_lines,
};
use table::{render_table, table_lead_height};
use widgets::{alpha_state_name, draw_widget};

/// Rendering options that do not belong to the document itself.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Font family to embed; `None` uses the built-in Helvetica family.
    pub font_family: Option<String>,
}

/// Vertical flow state: the page being filled plus every finished page.
struct PageCursor<'a> {
    setup: &'a PageSetup,
    content: Content,
    y: f32,
    touched: bool,
    template: PageTemplate,
    next_template: Option<PageTemplate>,
    finished: Vec<(Content, PageTemplate)>,
}

impl<'a> PageCursor<'a> {
    fn new(setup: &'a PageSetup) -> Self {
        Self {
            setup,
            content: Content::new(),
            y: setup.frame_top(),
            touched: false,
            template: PageTemplate::Body,
            next_template: None,
            finished: Vec::new(),
        }
    }

    fn remaining(&self) -> f32 {
        self.y - self.setup.margin_bottom
    }

    fn frame_height(&self) -> f32 {
        self.setup.frame_top() - self.setup.margin_bottom
    }

    fn new_page(&mut self) {
        let content = std::mem::replace(&mut self.content, Content::new());
        self.finished.push((content, self.template));
        if let Some(next) = self.next_template.take() {
            self.template = next;
        }
        self.y = self.setup.frame_top();
        self.touched = false;
    }

    /// Start a new page unless `height` still fits below the cursor.
    fn ensure(&mut self, height: f32) {
        if self.touched && height > self.remaining() {
            self.new_page();
        }
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
        self.touched = true;
    }

    fn set_next_template(&mut self, template: PageTemplate) {
        if self.touched {
            self.next_template = Some(template);
        } else {
            self.template = template;
        }
    }

    fn finish(mut self) -> Vec<(Content, PageTemplate)> {
        if self.touched || self.finished.is_empty() {
            let content = std::mem::replace(&mut self.content, Content::new());
            self.finished.push((content, self.template));
        }
        self.finished
    }
}

fn aligned_x(setup: &PageSetup, alignment: Alignment, width: f32) -> f32 {
    match alignment {
        Alignment::Center => setup.margin_left + (setup.frame_width() - width) / 2.0,
        Alignment::Left | Alignment::Justify => setup.margin_left,
    }
}

/// Height taken by a paragraph of `lines` lines, spacing excluded.
fn paragraph_height(para: &Paragraph, line_count: usize) -> f32 {
    line_count as f32 * line_pitch(para)
}

/// Minimum height a block needs at the top of a page, used by keep-with-next.
fn lead_height(block: &Block, fonts: &FontSet) -> f32 {
    match block {
        Block::Paragraph(p) => p.space_before + line_pitch(p),
        Block::Spacer(h) => *h,
        Block::Rule(r) => r.space_before + r.thickness,
        Block::Image { image, .. } => image.display_height,
        Block::Drawing(d) => d.height,
        Block::Table(t) => table_lead_height(t, fonts),
        Block::PageBreak | Block::NextTemplate(_) => 0.0,
    }
}

fn flow_paragraph(
    cursor: &mut PageCursor,
    para: &Paragraph,
    fonts: &FontSet,
    keep_next: f32,
) {
    let setup = cursor.setup;
    let x = setup.margin_left + para.indent_left;
    let width = (setup.frame_width() - para.indent_left).max(1.0);
    let lines = build_paragraph_lines(&para.runs, fonts, width);
    let pitch = line_pitch(para);
    let font_size = first_font_size(para);

    if is_text_empty(&para.runs) {
        let h = para.space_before + pitch + para.space_after;
        cursor.ensure(h);
        cursor.advance(h);
        return;
    }

    let full_h = para.space_before + paragraph_height(para, lines.len());
    if para.keep_with_next && full_h + keep_next <= cursor.frame_height() {
        cursor.ensure(full_h + keep_next);
    }
    cursor.ensure(para.space_before + pitch);
    if cursor.touched {
        cursor.advance(para.space_before);
    }

    let mut start = 0usize;
    while start < lines.len() {
        let fit = ((cursor.remaining() / pitch).floor() as usize).max(1);
        let end = (start + fit).min(lines.len());
        let baseline = cursor.y - pitch * 0.5 - font_size * 0.3;

        if start == 0
            && let Some(bullet) = &para.bullet
        {
            draw_text(
                &mut cursor.content,
                fonts,
                FontStyle::Regular,
                font_size,
                None,
                setup.margin_left + para.bullet_indent,
                baseline,
                Anchor::Start,
                bullet,
            );
        }
        render_paragraph_lines(
            &mut cursor.content,
            &lines[start..end],
            para.alignment,
            x,
            width,
            baseline,
            pitch,
            end == lines.len(),
            fonts,
        );
        cursor.advance(paragraph_height(para, end - start));
        start = end;
        if start < lines.len() {
            cursor.new_page();
        }
    }
    cursor.y -= para.space_after;
}

fn flow_rule(cursor: &mut PageCursor, rule: &Rule) {
    let setup = cursor.setup;
    cursor.ensure(rule.space_before + rule.thickness);
    cursor.advance(rule.space_before);
    let y = cursor.y - rule.thickness / 2.0;
    let [r, g, b] = rule.color;
    let content = &mut cursor.content;
    content.save_state();
    content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    content.set_line_width(rule.thickness);
    content.move_to(setup.margin_left, y);
    content.line_to(setup.page_width - setup.margin_right, y);
    content.stroke();
    content.restore_state();
    cursor.advance(rule.thickness + rule.space_after);
}

fn embed_image(
    pdf: &mut Pdf,
    img: &EmbeddedImage,
    name: String,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(String, Ref), Error> {
    let xobj_ref = alloc();
    match img.format {
        ImageFormat::Jpeg => {
            let mut xobj = pdf.image_xobject(xobj_ref, &img.data);
            xobj.filter(Filter::DctDecode);
            xobj.width(img.pixel_width as i32);
            xobj.height(img.pixel_height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }
        ImageFormat::Png => {
            let decoded = image::load_from_memory_with_format(&img.data, image::ImageFormat::Png)?;
            let rgba = decoded.to_rgba8();
            let (w, h) = (rgba.width(), rgba.height());
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

            let rgb_data: Vec<u8> = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

            let smask_ref = if has_alpha {
                let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w as i32);
                mask.height(h as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                Some(mask_ref)
            } else {
                None
            };

            let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }
    Ok((name, xobj_ref))
}

fn render_running_text(
    content: &mut Content,
    fonts: &FontSet,
    setup: &PageSetup,
    running: &RunningText,
    page_number: usize,
) {
    let left = setup.margin_left;
    let right = setup.page_width - setup.margin_right;
    let top = setup.page_height;

    let header_y = top - 1.5 * CM;
    let header = Some(running.header_color);
    for (x, anchor, text) in [
        (left, Anchor::Start, &running.header_left),
        (right, Anchor::End, &running.header_right),
    ] {
        draw_text(content, fonts, FontStyle::Regular, 9.0, header, x, header_y, anchor, text);
    }

    let line = |content: &mut Content, [r, g, b]: [u8; 3], width: f32, y: f32| {
        content.save_state();
        content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        content.set_line_width(width);
        content.move_to(left, y);
        content.line_to(right, y);
        content.stroke();
        content.restore_state();
    };
    line(content, running.header_rule_color, 0.5, top - 1.7 * CM);
    line(content, running.footer_rule_color, 1.0, 1.5 * CM);

    let footer = Some(running.footer_color);
    for (i, text) in running.footer_lines.iter().take(2).enumerate() {
        let y = 1.1 * CM - 0.4 * CM * i as f32;
        draw_text(content, fonts, FontStyle::Regular, 8.0, footer, left, y, Anchor::Start, text);
    }
    draw_text(
        content,
        fonts,
        FontStyle::Regular,
        8.0,
        footer,
        setup.page_width / 2.0,
        1.1 * CM,
        Anchor::Middle,
        &running.footer_center,
    );
    draw_text(
        content,
        fonts,
        FontStyle::Bold,
        9.0,
        footer,
        right,
        1.1 * CM,
        Anchor::End,
        &format!("{} {page_number}", running.page_label),
    );
}

fn collect_fill_alphas(doc: &Document) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut visit = |widget: &Widget| {
        if let Widget::Radar(r) = widget {
            names.insert(alpha_state_name(r.fill_alpha));
        }
    };
    for block in &doc.blocks {
        match block {
            Block::Drawing(d) => visit(&d.widget),
            Block::Table(t) => t
                .rows
                .iter()
                .flat_map(|r| r.cells.iter())
                .filter_map(|c| c.drawing.as_ref())
                .for_each(|d| visit(&d.widget)),
            _ => {}
        }
    }
    names
}

pub fn render(doc: &Document, options: &RenderOptions) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    // Phase 1: collect characters per style and embed the four font styles
    let mut used_chars: HashMap<FontStyle, HashSet<char>> = HashMap::new();
    doc.for_each_text(|style, text| {
        used_chars.entry(style).or_default().extend(text.chars());
    });
    // Always available for page numbers and formatted values
    for style in FontStyle::ALL {
        used_chars
            .entry(style)
            .or_default()
            .extend((32u8..127).map(char::from));
    }

    let t_collect = t0.elapsed();

    let fonts = FontSet::new(FontStyle::ALL.map(|style| {
        let used = used_chars.get(&style).cloned().unwrap_or_default();
        register_font(
            &mut pdf,
            options.font_family.as_deref(),
            style,
            format!("F{}", style as usize + 1),
            &mut alloc,
            &used,
        )
    }));

    let t_fonts = t0.elapsed();

    // Phase 1b: embed images, keyed by block index
    let mut image_names: HashMap<usize, String> = HashMap::new();
    let mut image_xobjects: Vec<(String, Ref)> = Vec::new();
    for (idx, block) in doc.blocks.iter().enumerate() {
        if let Block::Image { image, .. } = block {
            let name = format!("Im{}", image_xobjects.len() + 1);
            let (name, xobj_ref) = embed_image(&mut pdf, image, name, &mut alloc)?;
            image_names.insert(idx, name.clone());
            image_xobjects.push((name, xobj_ref));
        }
    }

    let mut alpha_states: Vec<(String, Ref)> = Vec::new();
    for name in collect_fill_alphas(doc) {
        let state_ref = alloc();
        let alpha = name
            .trim_start_matches("GA")
            .parse::<f32>()
            .map_err(|e| Error::Pdf(e.to_string()))?
            / 100.0;
        pdf.ext_graphics(state_ref).non_stroking_alpha(alpha);
        alpha_states.push((name, state_ref));
    }

    let t_images = t0.elapsed();

    // Phase 2: flow blocks into pages
    let setup = &doc.page;
    let mut cursor = PageCursor::new(setup);
    for (idx, block) in doc.blocks.iter().enumerate() {
        match block {
            Block::Paragraph(para) => {
                let keep_next = if para.keep_with_next {
                    doc.blocks
                        .get(idx + 1)
                        .map(|b| lead_height(b, &fonts))
                        .unwrap_or(0.0)
                } else {
                    0.0
                };
                flow_paragraph(&mut cursor, para, &fonts, keep_next);
            }
            Block::Spacer(h) => {
                if cursor.touched && *h > cursor.remaining() {
                    cursor.new_page();
                } else {
                    cursor.advance(*h);
                }
            }
            Block::PageBreak => {
                if cursor.touched {
                    cursor.new_page();
                }
            }
            Block::NextTemplate(template) => cursor.set_next_template(*template),
            Block::Rule(rule) => flow_rule(&mut cursor, rule),
            Block::Image { image, alignment } => {
                let Some(name) = image_names.get(&idx) else {
                    continue;
                };
                cursor.ensure(image.display_height);
                let x = aligned_x(setup, *alignment, image.display_width);
                let y = cursor.y - image.display_height;
                cursor.content.save_state();
                cursor.content.transform([
                    image.display_width,
                    0.0,
                    0.0,
                    image.display_height,
                    x,
                    y,
                ]);
                cursor.content.x_object(Name(name.as_bytes()));
                cursor.content.restore_state();
                cursor.advance(image.display_height);
            }
            Block::Drawing(drawing) => {
                cursor.ensure(drawing.height);
                let x = aligned_x(setup, drawing.alignment, drawing.width);
                draw_widget(&mut cursor.content, &fonts, drawing, x, cursor.y - drawing.height);
                cursor.advance(drawing.height);
            }
            Block::Table(t) => render_table(t, &mut cursor, &fonts),
        }
    }
    let mut pages = cursor.finish();

    let t_layout = t0.elapsed();

    if let Some(running) = &doc.running {
        for (i, (content, template)) in pages.iter_mut().enumerate() {
            if *template == PageTemplate::Body {
                render_running_text(content, &fonts, setup, running, i + 1);
            }
        }
    }

    let t_headers = t0.elapsed();

    // Phase 3: allocate page and content IDs now that page count is known
    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, (c, _)) in pages.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    {
        let info = &doc.info;
        let mut di = pdf.document_info(info_id);
        di.title(TextStr(&info.title));
        di.author(TextStr(&info.author));
        di.subject(TextStr(&info.subject));
        di.creator(TextStr(&info.creator));
        di.keywords(TextStr(&info.keywords));
        di.producer(TextStr(concat!("digei-report ", env!("CARGO_PKG_VERSION"))));
        di.finish();
    }

    let font_pairs: Vec<(String, Ref)> = fonts
        .entries()
        .map(|e| (e.pdf_name.clone(), e.font_ref))
        .collect();

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, setup.page_width, setup.page_height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut font_dict = resources.fonts();
            for (name, font_ref) in &font_pairs {
                font_dict.pair(Name(name.as_bytes()), *font_ref);
            }
        }
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
        if !alpha_states.is_empty() {
            let mut states = resources.ext_g_states();
            for (name, state_ref) in &alpha_states {
                states.pair(Name(name.as_bytes()), *state_ref);
            }
        }
    }

    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: collect_text={:.1}ms, font_embed={:.1}ms, images={:.1}ms, layout={:.1}ms, headers={:.1}ms, assembly={:.1}ms, pages={n}",
        t_collect.as_secs_f64() * 1000.0,
        (t_fonts - t_collect).as_secs_f64() * 1000.0,
        (t_images - t_fonts).as_secs_f64() * 1000.0,
        (t_layout - t_images).as_secs_f64() * 1000.0,
        (t_headers - t_layout).as_secs_f64() * 1000.0,
        (t_assembly - t_headers).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentInfo, Run};

    fn para(text: &str) -> Paragraph {
        Paragraph {
            runs: vec![Run::new(text, 10.0)],
            alignment: Alignment::Left,
            leading: 12.0,
            space_before: 0.0,
            space_after: 6.0,
            indent_left: 0.0,
            bullet: None,
            bullet_indent: 0.0,
            keep_with_next: false,
        }
    }

    fn doc(blocks: Vec<Block>) -> Document {
        Document {
            page: PageSetup::a4(),
            info: DocumentInfo::default(),
            running: None,
            blocks,
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        let text = String::from_utf8_lossy(bytes);
        text.matches("/Type /Page").count() - text.matches("/Type /Pages").count()
    }

    #[test]
    fn page_break_on_fresh_page_is_ignored() {
        let bytes = render(
            &doc(vec![Block::PageBreak, Block::Paragraph(para("uno")), Block::PageBreak]),
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn explicit_breaks_start_new_pages() {
        let bytes = render(
            &doc(vec![
                Block::Paragraph(para("uno")),
                Block::PageBreak,
                Block::Paragraph(para("dos")),
                Block::PageBreak,
                Block::Paragraph(para("tres")),
            ]),
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(page_count(&bytes), 3);
    }

    #[test]
    fn long_text_flows_onto_following_pages() {
        let long = "palabra ".repeat(6000);
        let bytes = render(&doc(vec![Block::Paragraph(para(&long))]), &RenderOptions::default())
            .unwrap();
        assert!(page_count(&bytes) > 1);
    }

    #[test]
    fn empty_document_still_has_a_page() {
        let bytes = render(&doc(Vec::new()), &RenderOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(page_count(&bytes), 1);
    }
}
