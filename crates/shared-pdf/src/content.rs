//! Content-stream interpretation
//!
//! Walks a page's operators with a simplified graphics and text state and
//! produces positioned text runs and placed images in page space.
//!
//! | Operator              | Action                                    |
//! |-----------------------|-------------------------------------------|
//! | `q` / `Q`             | Save / restore graphics state             |
//! | `cm`                  | Concatenate to the CTM                    |
//! | `BT`                  | Begin text object, reset text matrices    |
//! | `Tf`                  | Set font and size                         |
//! | `Tm`                  | Set text matrix                           |
//! | `Td` / `TD` / `T*`    | Move to next line                         |
//! | `TL` `Tc` `Tw` `Tz` `Ts` | Text state parameters                  |
//! | `Tj` / `TJ` / `'` / `"` | Show text                               |
//! | `Do`                  | Place an image or run a form XObject      |

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::coords::{number, BBox, Matrix, PageFrame};
use crate::fonts::{FontInfo, FontTable};
use crate::objects::{get, name_of, resolve_dict, stream_bytes};

/// Form XObjects nested deeper than this are not interpreted
const MAX_FORM_DEPTH: usize = 8;

/// Per-page work limits. A page that exceeds one is abandoned.
const MAX_OPERATIONS: usize = 1_000_000;
const MAX_FORM_INVOCATIONS: usize = 10_000;
const MAX_PAINTED_ITEMS: usize = 100_000;

/// A page's content needed more work than the interpreter allows
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitExceeded {
    #[error("more than {} content operators", MAX_OPERATIONS)]
    Operations,
    #[error("more than {} form XObject invocations", MAX_FORM_INVOCATIONS)]
    FormInvocations,
    #[error("more than {} painted text runs and images", MAX_PAINTED_ITEMS)]
    PaintedItems,
}

/// A string shown with one font at one size, positioned in page space
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font_name: String,
    /// Rendered size: `Tf` size scaled by the text and graphics matrices
    pub font_size: f32,
    pub bbox: BBox,
    /// Page-space y of the baseline origin
    pub baseline: f32,
}

/// Everything a content stream paints that layout cares about
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub runs: Vec<TextRun>,
    pub images: Vec<BBox>,
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_key: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horiz_scale: f32,
    leading: f32,
    rise: f32,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            font_key: Vec::new(),
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horiz_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

struct TextObject {
    matrix: Matrix,
    line_matrix: Matrix,
}

impl TextObject {
    fn new() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }
}

/// Interpret decoded page operators.
///
/// `resources` is the page's (possibly inherited) `/Resources` dictionary.
/// A form XObject that is already being drawn is not entered again.
pub fn interpret(
    doc: &Document,
    operations: &[Operation],
    resources: Option<&Dictionary>,
    frame: &PageFrame,
) -> Result<PageContent, LimitExceeded> {
    let mut interpreter = Interpreter {
        doc,
        frame,
        output: PageContent::default(),
        operations: 0,
        form_invocations: 0,
        active_forms: Vec::new(),
    };
    interpreter.run(operations, resources, Matrix::IDENTITY)?;
    Ok(interpreter.output)
}

struct Interpreter<'a> {
    doc: &'a Document,
    frame: &'a PageFrame,
    output: PageContent,
    operations: usize,
    form_invocations: usize,
    /// Forms currently being drawn, outermost first
    active_forms: Vec<ObjectId>,
}

impl<'a> Interpreter<'a> {
    fn run(
        &mut self,
        operations: &[Operation],
        resources: Option<&'a Dictionary>,
        base_ctm: Matrix,
    ) -> Result<(), LimitExceeded> {
        let fonts = FontTable::from_resources(self.doc, resources);
        let mut state = GraphicsState::new(base_ctm);
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut text = TextObject::new();

        for op in operations {
            self.operations += 1;
            if self.operations > MAX_OPERATIONS {
                return Err(LimitExceeded::Operations);
            }

            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.then(&state.ctm);
                    }
                }

                "BT" => text = TextObject::new(),
                "ET" => {}

                "Tf" => {
                    if let [Object::Name(key), size, ..] = operands.as_slice() {
                        state.font_key = key.clone();
                        state.font_size = number(size).unwrap_or(0.0);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        text.matrix = m;
                        text.line_matrix = m;
                    }
                }
                "Td" => {
                    if let Some((tx, ty)) = pair(operands) {
                        text.next_line(tx, ty);
                    }
                }
                "TD" => {
                    if let Some((tx, ty)) = pair(operands) {
                        state.leading = -ty;
                        text.next_line(tx, ty);
                    }
                }
                "T*" => text.next_line(0.0, -state.leading),
                "TL" => set_number(operands, &mut state.leading),
                "Tc" => set_number(operands, &mut state.char_spacing),
                "Tw" => set_number(operands, &mut state.word_spacing),
                "Ts" => set_number(operands, &mut state.rise),
                "Tz" => {
                    if let Some(v) = operands.first().and_then(number) {
                        state.horiz_scale = v / 100.0;
                    }
                }

                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, &fonts, &state, &mut text)?;
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    self.show(bytes, &fonts, &state, &mut text)?
                                }
                                other => {
                                    if let Some(adj) = number(other) {
                                        let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
                                        text.matrix = Matrix::translation(dx, 0.0).then(&text.matrix);
                                    }
                                }
                            }
                        }
                    }
                }
                "'" => {
                    text.next_line(0.0, -state.leading);
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, &fonts, &state, &mut text)?;
                    }
                }
                "\"" => {
                    if let [aw, ac, Object::String(bytes, _), ..] = operands.as_slice() {
                        state.word_spacing = number(aw).unwrap_or(state.word_spacing);
                        state.char_spacing = number(ac).unwrap_or(state.char_spacing);
                        text.next_line(0.0, -state.leading);
                        self.show(bytes, &fonts, &state, &mut text)?;
                    }
                }

                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.do_xobject(name, resources, &state)?;
                    }
                }

                _ => {}
            }
        }
        Ok(())
    }

    fn painted(&self) -> Result<(), LimitExceeded> {
        if self.output.runs.len() + self.output.images.len() >= MAX_PAINTED_ITEMS {
            return Err(LimitExceeded::PaintedItems);
        }
        Ok(())
    }

    fn show(
        &mut self,
        bytes: &[u8],
        fonts: &FontTable,
        state: &GraphicsState,
        text: &mut TextObject,
    ) -> Result<(), LimitExceeded> {
        let fallback;
        let font = match fonts.get(&state.font_key) {
            Some(font) => font,
            None => {
                fallback = FontInfo::fallback(&state.font_key);
                &fallback
            }
        };

        let glyphs = font.decode(bytes);
        let mut content = String::new();
        let mut advance = 0.0f32;
        for glyph in &glyphs {
            content.push_str(&glyph.text);
            let mut tx = glyph.width * state.font_size + state.char_spacing;
            if glyph.is_space {
                tx += state.word_spacing;
            }
            advance += tx * state.horiz_scale;
        }

        let render = text.matrix.then(&state.ctm);
        if !content.trim().is_empty() {
            let extent = BBox::new(
                0.0,
                font.descent * state.font_size + state.rise,
                advance,
                font.ascent * state.font_size + state.rise,
            );
            let bbox = self.frame.rect_to_page(&render.apply_rect(&extent));
            let (ox, oy) = render.apply(0.0, state.rise);
            let (_, baseline) = self.frame.to_page(ox, oy);

            self.painted()?;
            self.output.runs.push(TextRun {
                text: content,
                font_name: font.base_font.clone(),
                font_size: (state.font_size * render.vertical_scale()).abs(),
                bbox,
                baseline,
            });
        }

        text.matrix = Matrix::translation(advance, 0.0).then(&text.matrix);
        Ok(())
    }

    fn do_xobject(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        state: &GraphicsState,
    ) -> Result<(), LimitExceeded> {
        let doc = self.doc;
        let Some(xobjects) = resources
            .and_then(|res| get(doc, res, b"XObject"))
            .and_then(|obj| resolve_dict(doc, obj))
        else {
            return Ok(());
        };
        let form_id = match xobjects.get(name) {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        let Some(Object::Stream(stream)) = get(doc, xobjects, name) else {
            return Ok(());
        };

        match get(doc, &stream.dict, b"Subtype").and_then(name_of).as_deref() {
            Some("Image") => {
                let unit = BBox::new(0.0, 0.0, 1.0, 1.0);
                let placed = state.ctm.apply_rect(&unit);
                self.painted()?;
                self.output.images.push(self.frame.rect_to_page(&placed));
            }
            Some("Form") if self.active_forms.len() < MAX_FORM_DEPTH => {
                if form_id.is_some_and(|id| self.active_forms.contains(&id)) {
                    tracing::debug!("Skipping recursive form XObject");
                    return Ok(());
                }
                self.form_invocations += 1;
                if self.form_invocations > MAX_FORM_INVOCATIONS {
                    return Err(LimitExceeded::FormInvocations);
                }

                let form_matrix = match get(doc, &stream.dict, b"Matrix") {
                    Some(Object::Array(values)) => {
                        Matrix::from_operands(values).unwrap_or(Matrix::IDENTITY)
                    }
                    _ => Matrix::IDENTITY,
                };
                let form_resources = get(doc, &stream.dict, b"Resources")
                    .and_then(|obj| resolve_dict(doc, obj))
                    .or(resources);
                let Some(data) = stream_bytes(stream) else {
                    return Ok(());
                };
                let content = match Content::decode(&data) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::debug!("Skipping undecodable form XObject: {}", e);
                        return Ok(());
                    }
                };

                // Object number 0 is never allocated.
                self.active_forms.push(form_id.unwrap_or((0, 0)));
                let result = self.run(
                    &content.operations,
                    form_resources,
                    form_matrix.then(&state.ctm),
                );
                self.active_forms.pop();
                result?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn pair(operands: &[Object]) -> Option<(f32, f32)> {
    match operands {
        [a, b, ..] => Some((number(a)?, number(b)?)),
        _ => None,
    }
}

fn set_number(operands: &[Object], target: &mut f32) {
    if let Some(v) = operands.first().and_then(number) {
        *target = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::DEFAULT_PAGE_BOX;
    use lopdf::{Stream, StringFormat};

    fn frame() -> PageFrame {
        PageFrame::new(DEFAULT_PAGE_BOX, 0)
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn tf(size: i64) -> Operation {
        op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(size)])
    }

    fn tj(text: &str) -> Operation {
        op(
            "Tj",
            vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
        )
    }

    fn td(x: i64, y: i64) -> Operation {
        op("Td", vec![Object::Integer(x), Object::Integer(y)])
    }

    #[test]
    fn test_simple_tj_is_positioned_in_page_space() {
        let doc = Document::with_version("1.7");
        let ops = vec![op("BT", vec![]), tf(12), td(100, 700), tj("Hello"), op("ET", vec![])];

        let content = interpret(&doc, &ops, None, &frame()).unwrap();
        assert_eq!(content.runs.len(), 1);
        let run = &content.runs[0];
        assert_eq!(run.text, "Hello");
        assert_eq!(run.font_size, 12.0);
        assert_eq!(run.baseline, 92.0);
        assert!((run.bbox.x0 - 100.0).abs() < 1e-3);
        // Five glyphs at half an em each.
        assert!((run.bbox.x1 - 130.0).abs() < 1e-3);
        assert!(run.bbox.y0 < 92.0 && run.bbox.y1 > 92.0);
    }

    #[test]
    fn test_missing_font_resource_keeps_resource_name() {
        let doc = Document::with_version("1.7");
        let ops = vec![op("BT", vec![]), tf(10), tj("x"), op("ET", vec![])];
        let content = interpret(&doc, &ops, None, &frame()).unwrap();
        assert_eq!(content.runs[0].font_name, "F1");
    }

    #[test]
    fn test_cm_scales_effective_font_size() {
        let doc = Document::with_version("1.7");
        let ops = vec![
            op("q", vec![]),
            op(
                "cm",
                vec![
                    Object::Integer(2),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(2),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            op("BT", vec![]),
            tf(6),
            tj("big"),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            tf(6),
            tj("small"),
            op("ET", vec![]),
        ];
        let content = interpret(&doc, &ops, None, &frame()).unwrap();
        assert_eq!(content.runs[0].font_size, 12.0);
        assert_eq!(content.runs[1].font_size, 6.0);
    }

    #[test]
    fn test_tj_array_advances_past_kerning() {
        let doc = Document::with_version("1.7");
        let ops = vec![
            op("BT", vec![]),
            tf(10),
            td(0, 0),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::String(b"ab".to_vec(), StringFormat::Literal),
                    Object::Integer(-1000),
                    Object::String(b"cd".to_vec(), StringFormat::Literal),
                ])],
            ),
            op("ET", vec![]),
        ];
        let content = interpret(&doc, &ops, None, &frame()).unwrap();
        assert_eq!(content.runs.len(), 2);
        // "ab" is 10pt wide, then a full em of kerning.
        assert!((content.runs[1].bbox.x0 - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_t_star_uses_leading() {
        let doc = Document::with_version("1.7");
        let ops = vec![
            op("BT", vec![]),
            tf(12),
            td(72, 700),
            op("TL", vec![Object::Integer(14)]),
            tj("one"),
            op("T*", vec![]),
            tj("two"),
            op("ET", vec![]),
        ];
        let content = interpret(&doc, &ops, None, &frame()).unwrap();
        assert_eq!(content.runs[0].baseline, 92.0);
        assert_eq!(content.runs[1].baseline, 106.0);
        assert!((content.runs[1].bbox.x0 - 72.0).abs() < 1e-3);
    }

    #[test]
    fn test_whitespace_only_runs_are_dropped() {
        let doc = Document::with_version("1.7");
        let ops = vec![op("BT", vec![]), tf(12), tj("   "), op("ET", vec![])];
        let content = interpret(&doc, &ops, None, &frame()).unwrap();
        assert!(content.runs.is_empty());
    }

    /// Store a form at `id` that shows `label`, then draws `next` `repeats` times
    fn add_form(doc: &mut Document, id: ObjectId, label: &str, next: ObjectId, repeats: usize) {
        let mut ops = vec![op("BT", vec![]), tf(12), tj(label), op("ET", vec![])];
        ops.extend((0..repeats).map(|_| op("Do", vec![Object::Name(b"Next".to_vec())])));
        let resources = Dictionary::from_iter(vec![(
            "XObject",
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(next))])),
        )]);
        let dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Form".to_vec())),
            ("Resources", Object::Dictionary(resources)),
        ]);
        let data = Content { operations: ops }.encode().unwrap();
        doc.objects.insert(id, Object::Stream(Stream::new(dict, data)));
    }

    fn xobject_resources(form: ObjectId) -> Dictionary {
        Dictionary::from_iter(vec![(
            "XObject",
            Object::Dictionary(Dictionary::from_iter(vec![("Fm0", Object::Reference(form))])),
        )])
    }

    fn draw_form() -> Operation {
        op("Do", vec![Object::Name(b"Fm0".to_vec())])
    }

    #[test]
    fn test_self_drawing_form_is_entered_once() {
        let mut doc = Document::with_version("1.7");
        let id = doc.new_object_id();
        add_form(&mut doc, id, "loop", id, 12);
        let resources = xobject_resources(id);

        let content = interpret(&doc, &[draw_form()], Some(&resources), &frame()).unwrap();
        assert_eq!(content.runs.len(), 1);
        assert_eq!(content.runs[0].text, "loop");
    }

    #[test]
    fn test_form_drawn_twice_in_sequence_paints_twice() {
        let mut doc = Document::with_version("1.7");
        let id = doc.new_object_id();
        add_form(&mut doc, id, "stamp", id, 0);
        let resources = xobject_resources(id);

        let ops = vec![draw_form(), draw_form()];
        let content = interpret(&doc, &ops, Some(&resources), &frame()).unwrap();
        assert_eq!(content.runs.len(), 2);
    }

    #[test]
    fn test_form_fan_out_hits_invocation_limit() {
        let mut doc = Document::with_version("1.7");
        let ids: Vec<ObjectId> = (0..6).map(|_| doc.new_object_id()).collect();
        for (i, id) in ids.iter().enumerate() {
            let next = ids.get(i + 1).copied().unwrap_or(*id);
            add_form(&mut doc, *id, "fan", next, 12);
        }
        let resources = xobject_resources(ids[0]);

        let err = interpret(&doc, &[draw_form()], Some(&resources), &frame()).unwrap_err();
        assert_eq!(err, LimitExceeded::FormInvocations);
    }
}
