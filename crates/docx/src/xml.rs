//! Small helpers over quick-xml events for WordprocessingML.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

pub(crate) const TWIPS_PER_INCH: f64 = 1440.0;

/// `w:line` value for single spacing when `w:lineRule="auto"`.
pub(crate) const LINE_UNITS_PER_MULTIPLE: f64 = 240.0;

/// Schema order of `w:pPr` children. Word rejects properties written out of order.
const PARAGRAPH_PROPERTY_ORDER: &[&str] = &[
    "w:pStyle",
    "w:keepNext",
    "w:keepLines",
    "w:pageBreakBefore",
    "w:framePr",
    "w:widowControl",
    "w:numPr",
    "w:suppressLineNumbers",
    "w:pBdr",
    "w:shd",
    "w:tabs",
    "w:suppressAutoHyphens",
    "w:kinsoku",
    "w:wordWrap",
    "w:overflowPunct",
    "w:topLinePunct",
    "w:autoSpaceDE",
    "w:autoSpaceDN",
    "w:bidi",
    "w:adjustRightInd",
    "w:snapToGrid",
    "w:spacing",
    "w:ind",
    "w:contextualSpacing",
    "w:mirrorIndents",
    "w:suppressOverlap",
    "w:jc",
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// Containers whose text is not part of the paragraph's own text.
const HIDDEN_TEXT_CONTAINERS: &[&[u8]] = &[b"w:del", b"w:txbxContent", b"mc:Fallback"];

pub(crate) fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Raw attribute value by qualified name.
pub(crate) fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

pub(crate) fn get_attr_i32(e: &BytesStart, key: &[u8]) -> Option<i32> {
    get_attr(e, key).and_then(|v| v.trim().parse().ok())
}

pub(crate) fn twips_to_inches(twips: i32) -> f64 {
    f64::from(twips) / TWIPS_PER_INCH
}

pub(crate) fn inches_to_twips(inches: f64) -> i32 {
    (inches * TWIPS_PER_INCH).round() as i32
}

/// Rank of a `w:pPr` child; unknown elements sort after every known one.
pub(crate) fn property_rank(name: &str) -> usize {
    PARAGRAPH_PROPERTY_ORDER
        .iter()
        .position(|known| *known == name)
        .unwrap_or(PARAGRAPH_PROPERTY_ORDER.len())
}

pub(crate) fn is_hidden_text_container(name: &[u8]) -> bool {
    HIDDEN_TEXT_CONTAINERS.contains(&name)
}

/// Copy `original`'s attributes into a fresh element, replacing `set` and dropping `remove`.
pub(crate) fn merge_attributes(
    name: &str,
    original: Option<&BytesStart>,
    set: &[(&str, String)],
    remove: &[&str],
) -> BytesStart<'static> {
    let mut element = BytesStart::new(name.to_string());

    if let Some(original) = original {
        for attr in original.attributes().flatten() {
            let key = attr.key.as_ref();
            let replaced = set.iter().any(|(k, _)| k.as_bytes() == key);
            let removed = remove.iter().any(|k| k.as_bytes() == key);
            if !replaced && !removed {
                element.push_attribute((key, attr.value.as_ref()));
            }
        }
    }

    for (key, value) in set {
        element.push_attribute((*key, value.as_str()));
    }
    element
}

/// A single run holding `text`; tabs and newlines become `w:tab` and `w:br`.
pub(crate) fn text_run(text: &str, run_properties: &[Event<'static>]) -> Vec<Event<'static>> {
    let mut events = vec![Event::Start(BytesStart::new("w:r"))];
    events.extend(run_properties.iter().cloned());

    let mut pending = String::new();
    for c in text.chars() {
        match c {
            '\t' => {
                flush_text(&mut events, &mut pending);
                events.push(Event::Empty(BytesStart::new("w:tab")));
            }
            '\n' => {
                flush_text(&mut events, &mut pending);
                events.push(Event::Empty(BytesStart::new("w:br")));
            }
            c => pending.push(c),
        }
    }
    flush_text(&mut events, &mut pending);

    events.push(Event::End(BytesEnd::new("w:r")));
    events
}

fn flush_text(events: &mut Vec<Event<'static>>, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let mut start = BytesStart::new("w:t");
    start.push_attribute(("xml:space", "preserve"));
    events.push(Event::Start(start));
    events.push(Event::Text(BytesText::new(pending).into_owned()));
    events.push(Event::End(BytesEnd::new("w:t")));
    pending.clear();
}
