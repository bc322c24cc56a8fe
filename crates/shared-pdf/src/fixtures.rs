//! In-memory PDF builder for tests
//!
//! Produces small but structurally real documents: a page tree, Type1 font
//! resources, content streams, image and form XObjects.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// A single `Tj` at a fixed position
#[derive(Debug, Clone)]
pub struct TextItem {
    text: String,
    font: String,
    size: f32,
    x: f32,
    y: f32,
}

impl TextItem {
    /// Times-Roman 12pt at (72, 700) in PDF user space
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: "Times-Roman".to_string(),
            size: 12.0,
            x: 72.0,
            y: 700.0,
        }
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Baseline origin in PDF user space (bottom-left origin)
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

#[derive(Debug, Clone)]
struct FormChain {
    item: TextItem,
    depth: usize,
    repeats: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PageSpec {
    texts: Vec<TextItem>,
    form_texts: Vec<TextItem>,
    form_chain: Option<FormChain>,
    images: Vec<[f32; 4]>,
    media_box: Option<[f32; 4]>,
    rotate: Option<i64>,
}

impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, item: TextItem) -> Self {
        self.texts.push(item);
        self
    }

    /// Text drawn through a form XObject rather than the page stream
    pub fn form_text(mut self, item: TextItem) -> Self {
        self.form_texts.push(item);
        self
    }

    /// `depth` form XObjects, each showing `item` and then drawing the next
    /// one `repeats` times. The last form draws itself.
    pub fn form_chain(mut self, item: TextItem, depth: usize, repeats: usize) -> Self {
        self.form_chain = Some(FormChain {
            item,
            depth,
            repeats,
        });
        self
    }

    /// Image placed with its lower-left corner at (x, y) in user space
    pub fn image(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.images.push([x, y, width, height]);
        self
    }

    pub fn media_box(mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.media_box = Some([x0, y0, x1, y1]);
        self
    }

    pub fn rotate(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PdfBuilder {
    pages: Vec<PageSpec>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.pages.push(page);
        self
    }

    /// One page per entry, each holding a single default-styled line
    pub fn text_pages<S: AsRef<str>>(mut self, texts: &[S]) -> Self {
        for text in texts {
            self.pages
                .push(PageSpec::new().text(TextItem::new(text.as_ref())));
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut fonts = FontRegistry::default();

        let mut kids = Vec::new();
        for spec in &self.pages {
            let page_id = add_page(&mut doc, pages_id, spec, &mut fonts);
            kids.push(Object::Reference(page_id));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(kids.len() as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).expect("save fixture PDF");
        buffer
    }
}

/// Shared font objects keyed by base font name
#[derive(Default)]
struct FontRegistry {
    ids: BTreeMap<String, ObjectId>,
}

impl FontRegistry {
    fn resource_key(&self, base_font: &str) -> String {
        let idx = self.ids.keys().position(|k| k == base_font).unwrap_or(0);
        format!("F{}", idx + 1)
    }

    fn register(&mut self, doc: &mut Document, base_font: &str) {
        if !self.ids.contains_key(base_font) {
            let id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Font".to_vec())),
                ("Subtype", Object::Name(b"Type1".to_vec())),
                ("BaseFont", Object::Name(base_font.as_bytes().to_vec())),
            ]));
            self.ids.insert(base_font.to_string(), id);
        }
    }

    fn resources(&self) -> Dictionary {
        let mut fonts = Dictionary::new();
        for base_font in self.ids.keys() {
            fonts.set(
                self.resource_key(base_font),
                Object::Reference(self.ids[base_font]),
            );
        }
        fonts
    }
}

fn text_operations(items: &[TextItem], fonts: &FontRegistry) -> Vec<Operation> {
    let mut ops = Vec::new();
    for item in items {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(fonts.resource_key(&item.font).into_bytes()),
                Object::Real(item.size.into()),
            ],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Real(item.x.into()), Object::Real(item.y.into())],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(
                item.text.as_bytes().to_vec(),
                StringFormat::Literal,
            )],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

fn encode(operations: Vec<Operation>) -> Vec<u8> {
    Content { operations }.encode().expect("encode fixture content")
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    spec: &PageSpec,
    fonts: &mut FontRegistry,
) -> ObjectId {
    let chained = spec.form_chain.iter().map(|chain| &chain.item);
    for item in spec.texts.iter().chain(&spec.form_texts).chain(chained) {
        fonts.register(doc, &item.font);
    }

    let mut ops = text_operations(&spec.texts, fonts);
    let mut xobjects = Dictionary::new();

    for (i, [x, y, w, h]) in spec.images.iter().copied().enumerate() {
        let name = format!("Im{}", i + 1);
        let image = Stream::new(
            Dictionary::from_iter(vec![
                ("Type", Object::Name(b"XObject".to_vec())),
                ("Subtype", Object::Name(b"Image".to_vec())),
                ("Width", Object::Integer(1)),
                ("Height", Object::Integer(1)),
                ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
                ("BitsPerComponent", Object::Integer(8)),
            ]),
            vec![0x80],
        );
        xobjects.set(name.clone(), Object::Reference(doc.add_object(image)));
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            [w, 0.0, 0.0, h, x, y]
                .into_iter()
                .map(|v| Object::Real(v.into()))
                .collect(),
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        ops.push(Operation::new("Q", vec![]));
    }

    if !spec.form_texts.is_empty() {
        let form = Stream::new(
            Dictionary::from_iter(vec![
                ("Type", Object::Name(b"XObject".to_vec())),
                ("Subtype", Object::Name(b"Form".to_vec())),
                (
                    "BBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(612),
                        Object::Integer(792),
                    ]),
                ),
                (
                    "Resources",
                    Object::Dictionary(Dictionary::from_iter(vec![(
                        "Font",
                        Object::Dictionary(fonts.resources()),
                    )])),
                ),
            ]),
            encode(text_operations(&spec.form_texts, fonts)),
        );
        xobjects.set("Fm1", Object::Reference(doc.add_object(form)));
        ops.push(Operation::new("Do", vec![Object::Name(b"Fm1".to_vec())]));
    }

    if let Some(chain) = &spec.form_chain {
        let ids: Vec<ObjectId> = (0..chain.depth).map(|_| doc.new_object_id()).collect();
        for (i, id) in ids.iter().enumerate() {
            let next = ids.get(i + 1).unwrap_or(id);
            let mut form_ops = text_operations(std::slice::from_ref(&chain.item), fonts);
            form_ops.extend(
                (0..chain.repeats).map(|_| Operation::new("Do", vec![Object::Name(b"Next".to_vec())])),
            );
            let form = Stream::new(
                Dictionary::from_iter(vec![
                    ("Type", Object::Name(b"XObject".to_vec())),
                    ("Subtype", Object::Name(b"Form".to_vec())),
                    (
                        "Resources",
                        Object::Dictionary(Dictionary::from_iter(vec![
                            ("Font", Object::Dictionary(fonts.resources())),
                            (
                                "XObject",
                                Object::Dictionary(Dictionary::from_iter(vec![(
                                    "Next",
                                    Object::Reference(*next),
                                )])),
                            ),
                        ])),
                    ),
                ]),
                encode(form_ops),
            );
            doc.objects.insert(*id, Object::Stream(form));
        }
        if let Some(first) = ids.first() {
            xobjects.set("Chain", Object::Reference(*first));
            ops.push(Operation::new("Do", vec![Object::Name(b"Chain".to_vec())]));
        }
    }

    let content_id = doc.add_object(Stream::new(Dictionary::new(), encode(ops)));

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts.resources()));
    if !spec.images.is_empty() || !spec.form_texts.is_empty() || spec.form_chain.is_some() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }

    let [x0, y0, x1, y1] = spec.media_box.unwrap_or([0.0, 0.0, 612.0, 792.0]);
    let mut page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(
                [x0, y0, x1, y1]
                    .into_iter()
                    .map(|v| Object::Real(v.into()))
                    .collect(),
            ),
        ),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Dictionary(resources)),
    ]);
    if let Some(rotate) = spec.rotate {
        page.set("Rotate", Object::Integer(rotate));
    }

    doc.add_object(page)
}
