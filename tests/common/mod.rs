//! Shared fixtures: small PDFs synthesised with lopdf.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

pub const BODY: &str = "Ordinary paragraph text that carries most of the characters here.";

/// One line of text: (bold, size, baseline y in PDF space, text).
pub type TextLine<'a> = (bool, f32, f32, &'a str);

/// ToUnicode CMap for `F4`: codes 1 to 7 spell out "Summary".
const SUMMARY_CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
7 beginbfchar
<0001> <0053>
<0002> <0075>
<0003> <006D>
<0004> <006D>
<0005> <0061>
<0006> <0072>
<0007> <0079>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

/// Build a US Letter PDF with one content stream per page.
///
/// `F1` is Helvetica and `F2` Helvetica-Bold.
pub fn build_pdf(pages: &[Vec<TextLine<'_>>]) -> Vec<u8> {
    let contents: Vec<String> = pages
        .iter()
        .map(|lines| {
            lines
                .iter()
                .map(|(is_bold, size, y, text)| {
                    format!(
                        "BT /{} {} Tf 72 {} Td ({}) Tj ET\n",
                        if *is_bold { "F2" } else { "F1" },
                        size,
                        y,
                        text
                    )
                })
                .collect()
        })
        .collect();
    build_pdf_from_content(&contents)
}

/// Build a US Letter PDF from raw content streams, one per page.
///
/// `F1` is Helvetica and `F2` Helvetica-Bold, both without an encoding.
/// `F3` is Helvetica-Bold with WinAnsiEncoding. `F4` is a bold Identity-H
/// Type0 font whose ToUnicode CMap maps codes 1 to 7 to "Summary".
pub fn build_pdf_from_content(pages: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let win_ansi = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let cmap = doc.add_object(Object::Stream(Stream::new(
        lopdf::Dictionary::new(),
        SUMMARY_CMAP.to_vec(),
    )));
    let identity = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "ABCDEF+NotoSans-Bold",
        "Encoding" => "Identity-H",
        "ToUnicode" => cmap,
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Object::Stream(Stream::new(
            lopdf::Dictionary::new(),
            content.clone().into_bytes(),
        )));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => Object::Dictionary(dictionary! {
                "Font" => Object::Dictionary(dictionary! {
                    "F1" => regular,
                    "F2" => bold,
                    "F3" => win_ansi,
                    "F4" => identity,
                }),
            }),
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Two pages: a 24pt bold title over a 12pt paragraph, then a 16pt bold
/// numbered heading over three 11pt lines.
pub fn annual_report_pdf() -> Vec<u8> {
    build_pdf(&[
        vec![
            (true, 24.0, 700.0, "Annual Report"),
            (false, 12.0, 650.0, BODY),
        ],
        vec![
            (true, 16.0, 720.0, "1. Introduction"),
            (false, 11.0, 690.0, BODY),
            (false, 11.0, 675.0, BODY),
            (false, 11.0, 660.0, BODY),
        ],
    ])
}
