//! In-memory PDF builder for unit tests.
//!
//! Every page gets the same resources: `/F1` Helvetica and `/F2` Times-Bold
//! (both WinAnsi, no `/Widths`), an image XObject `/Im0`, and a form
//! XObject `/Fm0` that shows the text "Hidden" with `/F1` from its own
//! resources.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

pub(crate) struct TestPdf {
    pages: Vec<Vec<String>>,
    parent_media_box: Option<[f64; 4]>,
    media_box: [f64; 4],
    extra_fonts: Vec<(String, FontBuilder)>,
    form_content: String,
    form_matrix: Option<[f64; 6]>,
    form_paints_itself: bool,
}

type FontBuilder = Box<dyn FnOnce(&mut Document) -> Dictionary>;

impl TestPdf {
    pub(crate) fn new() -> Self {
        Self {
            pages: Vec::new(),
            parent_media_box: None,
            media_box: [0.0, 0.0, 612.0, 792.0],
            extra_fonts: Vec::new(),
            form_content: "BT /F1 12 Tf 10 10 Td (Hidden) Tj ET".to_string(),
            form_matrix: None,
            form_paints_itself: false,
        }
    }

    /// Add a page with one content stream.
    pub(crate) fn page(mut self, content: &str) -> Self {
        self.pages.push(vec![content.to_string()]);
        self
    }

    /// Add a page whose `/Contents` is an array of streams.
    pub(crate) fn page_streams(mut self, streams: &[&str]) -> Self {
        self.pages.push(streams.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Put MediaBox and Resources on the page tree node instead of the pages.
    pub(crate) fn inherit_media_box(mut self, mb: [f64; 4]) -> Self {
        self.parent_media_box = Some(mb);
        self
    }

    pub(crate) fn media_box(mut self, mb: [f64; 4]) -> Self {
        self.media_box = mb;
        self
    }

    /// Replace the content and `/Matrix` of form `/Fm0`.
    pub(crate) fn form(mut self, content: &str, matrix: Option<[f64; 6]>) -> Self {
        self.form_content = content.to_string();
        self.form_matrix = matrix;
        self
    }

    /// List `/Fm0` in the form's own XObject resources.
    pub(crate) fn form_paints_itself(mut self) -> Self {
        self.form_paints_itself = true;
        self
    }

    /// Register an extra font resource. `build` receives the document so
    /// the font can add its own streams (ToUnicode, descendants).
    pub(crate) fn font(
        mut self,
        name: &str,
        build: impl FnOnce(&mut Document) -> Dictionary + 'static,
    ) -> Self {
        self.extra_fonts.push((name.to_string(), Box::new(build)));
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();

        let f1 = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let f2 = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let image = doc.add_object(Object::Stream(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2i64,
                "Height" => 2i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
            },
            vec![255u8, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 0],
        )));
        let form: ObjectId = doc.new_object_id();
        let mut form_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 200.into(), 50.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => f1 },
            },
        };
        if self.form_paints_itself {
            if let Ok(Object::Dictionary(res)) = form_dict.get_mut(b"Resources") {
                res.set("XObject", dictionary! { "Fm0" => form });
            }
        }
        if let Some(m) = self.form_matrix {
            form_dict.set("Matrix", Object::Array(m.iter().map(|n| Object::from(*n)).collect()));
        }
        let form_stream = Stream::new(form_dict, self.form_content.into_bytes());
        doc.objects.insert(form, Object::Stream(form_stream));

        let mut fonts = dictionary! { "F1" => f1, "F2" => f2 };
        for (name, build) in self.extra_fonts {
            let dict = build(&mut doc);
            let id = doc.add_object(dict);
            fonts.set(name.into_bytes(), id);
        }
        let resources = dictionary! {
            "Font" => fonts,
            "XObject" => dictionary! { "Im0" => image, "Fm0" => form },
        };

        let mut kids: Vec<Object> = Vec::new();
        for streams in &self.pages {
            let ids: Vec<Object> = streams
                .iter()
                .map(|s| {
                    let stream = Stream::new(Dictionary::new(), s.as_bytes().to_vec());
                    Object::from(doc.add_object(Object::Stream(stream)))
                })
                .collect();
            let contents = if ids.len() == 1 {
                ids[0].clone()
            } else {
                Object::Array(ids)
            };
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => contents,
            };
            if self.parent_media_box.is_none() {
                page.set("MediaBox", rect(self.media_box));
                page.set("Resources", resources.clone());
            }
            kids.push(doc.add_object(page).into());
        }

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        };
        if let Some(mb) = self.parent_media_box {
            pages.set("MediaBox", rect(mb));
            pages.set("Resources", resources);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }

    /// Build and parse back with lopdf.
    pub(crate) fn load(self) -> Document {
        Document::load_mem(&self.build()).expect("failed to load test PDF")
    }
}

fn rect(v: [f64; 4]) -> Object {
    Object::Array(v.iter().map(|n| Object::from(*n)).collect())
}
