use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tocfmt_core::{ParagraphModel, TabAlignment, TabLeader, TabStop};

use crate::xml::{
    element_name, get_attr_i32, inches_to_twips, is_hidden_text_container, merge_attributes,
    property_rank, text_run, twips_to_inches, LINE_UNITS_PER_MULTIPLE,
};
use crate::DocxError;

/// Largest length Word accepts for indents, tab stops and paragraph spacing.
pub const MAX_LENGTH_INCHES: f64 = 22.0;

/// Largest line spacing multiple Word accepts.
pub const MAX_LINE_SPACING: f64 = 132.0;

/// One direct child of `w:pPr`, kept as its raw events.
#[derive(Debug, Clone)]
struct Property {
    name: String,
    events: Vec<Event<'static>>,
}

impl Property {
    fn element(&self) -> Option<&BytesStart<'static>> {
        match self.events.first() {
            Some(Event::Start(e)) | Some(Event::Empty(e)) => Some(e),
            _ => None,
        }
    }
}

/// Pending changes, applied when the paragraph is written back.
#[derive(Debug, Clone, Default)]
struct Edit {
    text: Option<String>,
    /// `Some` replaces the paragraph's tab stops.
    tabs: Option<Vec<TabStop>>,
    keep_existing_tabs: bool,
    left_indent: Option<i32>,
    first_line_indent: Option<i32>,
    line: Option<i32>,
    space_before: Option<i32>,
    space_after: Option<i32>,
}

impl Edit {
    fn touches_indent(&self) -> bool {
        self.left_indent.is_some() || self.first_line_indent.is_some()
    }

    fn touches_spacing(&self) -> bool {
        self.line.is_some() || self.space_before.is_some() || self.space_after.is_some()
    }
}

/// A body-level `w:p` element.
///
/// Reads come from the parsed XML. Writes are buffered; a paragraph that was never
/// written to is serialized from its original events unchanged.
#[derive(Debug, Clone)]
pub struct Paragraph {
    original: Vec<Event<'static>>,
    start: BytesStart<'static>,
    properties_start: Option<BytesStart<'static>>,
    properties: Vec<Property>,
    content: Vec<Event<'static>>,
    run_properties: Vec<Event<'static>>,
    text: String,
    left_indent_twips: Option<i32>,
    edit: Option<Edit>,
}

impl Paragraph {
    /// Build from the complete event sequence of one `w:p`, start tag to end tag.
    pub(crate) fn from_events(original: Vec<Event<'static>>) -> Self {
        let (start, inner) = match original.split_first() {
            Some((Event::Start(e), rest)) => (e.clone(), &rest[..rest.len().saturating_sub(1)]),
            Some((Event::Empty(e), _)) => (e.clone(), &[][..]),
            _ => (BytesStart::new("w:p"), &[][..]),
        };

        let mut properties_start = None;
        let mut properties: Vec<Property> = Vec::new();
        let mut content = Vec::new();
        let mut depth = 0usize;
        let mut in_properties = false;

        for event in inner {
            if in_properties {
                match event {
                    Event::Start(e) if depth == 1 => {
                        properties.push(Property {
                            name: element_name(e),
                            events: vec![event.clone()],
                        });
                        depth += 1;
                    }
                    Event::Empty(e) if depth == 1 => properties.push(Property {
                        name: element_name(e),
                        events: vec![event.clone()],
                    }),
                    Event::End(_) if depth == 1 => {
                        in_properties = false;
                        depth = 0;
                    }
                    // Whitespace between property elements.
                    _ if depth == 1 => {}
                    _ => {
                        if let Some(property) = properties.last_mut() {
                            property.events.push(event.clone());
                        }
                        match event {
                            Event::Start(_) => depth += 1,
                            Event::End(_) => depth -= 1,
                            _ => {}
                        }
                    }
                }
                continue;
            }

            match event {
                Event::Start(e) if depth == 0 && e.name().as_ref() == b"w:pPr" => {
                    properties_start = Some(e.clone());
                    in_properties = true;
                    depth = 1;
                }
                Event::Empty(e) if depth == 0 && e.name().as_ref() == b"w:pPr" => {
                    properties_start = Some(e.clone());
                }
                _ => {
                    match event {
                        Event::Start(_) => depth += 1,
                        Event::End(_) => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    content.push(event.clone());
                }
            }
        }

        let left_indent_twips = read_left_indent(&properties);

        Paragraph {
            text: collect_text(&content),
            run_properties: first_run_properties(&content),
            original,
            start,
            properties_start,
            properties,
            content,
            left_indent_twips,
            edit: None,
        }
    }

    /// Whether any write has been buffered.
    pub fn is_modified(&self) -> bool {
        self.edit.is_some()
    }

    fn edit_mut(&mut self) -> &mut Edit {
        self.edit.get_or_insert_with(Edit::default)
    }

    pub(crate) fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), quick_xml::Error> {
        let events = match &self.edit {
            None => return write_all(writer, &self.original),
            Some(edit) => self.rebuild(edit),
        };
        write_all(writer, &events)
    }

    fn rebuild(&self, edit: &Edit) -> Vec<Event<'static>> {
        let mut properties: Vec<Property> = self
            .properties
            .iter()
            .filter(|p| match p.name.as_str() {
                "w:tabs" => edit.tabs.is_none(),
                "w:ind" => !edit.touches_indent(),
                "w:spacing" => !edit.touches_spacing(),
                _ => true,
            })
            .cloned()
            .collect();

        for generated in self.generated_properties(edit) {
            let rank = property_rank(&generated.name);
            let at = properties
                .iter()
                .position(|p| property_rank(&p.name) > rank)
                .unwrap_or(properties.len());
            properties.insert(at, generated);
        }

        let mut events = vec![Event::Start(self.start.clone())];

        if !properties.is_empty() || self.properties_start.is_some() {
            let properties_start = self
                .properties_start
                .clone()
                .unwrap_or_else(|| BytesStart::new("w:pPr"));
            events.push(Event::Start(properties_start));
            for property in &properties {
                events.extend(property.events.iter().cloned());
            }
            events.push(Event::End(BytesEnd::new("w:pPr")));
        }

        match &edit.text {
            Some(text) => events.extend(text_run(text, &self.run_properties)),
            None => events.extend(self.content.iter().cloned()),
        }

        events.push(Event::End(BytesEnd::new("w:p")));
        events
    }

    fn existing(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    fn generated_properties(&self, edit: &Edit) -> Vec<Property> {
        let mut generated = Vec::new();

        if let Some(tabs) = &edit.tabs {
            let mut events = Vec::new();
            if edit.keep_existing_tabs {
                if let Some(existing) = self.existing("w:tabs") {
                    // Everything between the w:tabs start and end tags.
                    let inner = existing.events.len().saturating_sub(1);
                    events.extend(existing.events.iter().take(inner).skip(1).cloned());
                }
            }
            events.extend(tabs.iter().map(|stop| Event::Empty(tab_element(stop))));
            if !events.is_empty() {
                events.insert(0, Event::Start(BytesStart::new("w:tabs")));
                events.push(Event::End(BytesEnd::new("w:tabs")));
                generated.push(Property {
                    name: "w:tabs".to_string(),
                    events,
                });
            }
        }

        if edit.touches_spacing() {
            let mut set = Vec::new();
            if let Some(before) = edit.space_before {
                set.push(("w:before", before.to_string()));
            }
            if let Some(after) = edit.space_after {
                set.push(("w:after", after.to_string()));
            }
            if let Some(line) = edit.line {
                set.push(("w:line", line.to_string()));
                set.push(("w:lineRule", "auto".to_string()));
            }
            let original = self.existing("w:spacing").and_then(Property::element);
            let element = merge_attributes(
                "w:spacing",
                original,
                &set,
                &["w:beforeAutospacing", "w:afterAutospacing"],
            );
            generated.push(Property {
                name: "w:spacing".to_string(),
                events: vec![Event::Empty(element)],
            });
        }

        if edit.touches_indent() {
            let mut set = Vec::new();
            let mut remove = Vec::new();
            if let Some(left) = edit.left_indent {
                set.push(("w:left", left.to_string()));
                remove.push("w:start");
            }
            if let Some(first_line) = edit.first_line_indent {
                if first_line < 0 {
                    set.push(("w:hanging", (-first_line).to_string()));
                    remove.push("w:firstLine");
                } else {
                    set.push(("w:firstLine", first_line.to_string()));
                    remove.push("w:hanging");
                }
            }
            let original = self.existing("w:ind").and_then(Property::element);
            let element = merge_attributes("w:ind", original, &set, &remove);
            generated.push(Property {
                name: "w:ind".to_string(),
                events: vec![Event::Empty(element)],
            });
        }

        generated
    }
}

impl ParagraphModel for Paragraph {
    type Error = DocxError;

    fn text(&self) -> String {
        self.text.clone()
    }

    fn left_indent(&self) -> Option<f64> {
        self.left_indent_twips.map(twips_to_inches)
    }

    fn discard_edits(&mut self) {
        if self.edit.take().is_some() {
            self.text = collect_text(&self.content);
            self.left_indent_twips = read_left_indent(&self.properties);
        }
    }

    fn set_text(&mut self, text: &str) -> Result<(), DocxError> {
        self.text = text.to_string();
        self.edit_mut().text = Some(text.to_string());
        Ok(())
    }

    fn clear_tab_stops(&mut self) -> Result<(), DocxError> {
        let edit = self.edit_mut();
        edit.tabs = Some(Vec::new());
        edit.keep_existing_tabs = false;
        Ok(())
    }

    fn add_tab_stop(&mut self, stop: TabStop) -> Result<(), DocxError> {
        check_length("tab position", stop.position)?;
        let edit = self.edit_mut();
        match edit.tabs.as_mut() {
            Some(tabs) => tabs.push(stop),
            None => {
                edit.tabs = Some(vec![stop]);
                edit.keep_existing_tabs = true;
            }
        }
        Ok(())
    }

    fn set_left_indent(&mut self, inches: f64) -> Result<(), DocxError> {
        check_length("left indent", inches)?;
        let twips = inches_to_twips(inches);
        self.left_indent_twips = Some(twips);
        self.edit_mut().left_indent = Some(twips);
        Ok(())
    }

    fn set_first_line_indent(&mut self, inches: f64) -> Result<(), DocxError> {
        check_length("first line indent", inches)?;
        self.edit_mut().first_line_indent = Some(inches_to_twips(inches));
        Ok(())
    }

    fn set_line_spacing(&mut self, multiple: f64) -> Result<(), DocxError> {
        if !multiple.is_finite() || multiple <= 0.0 || multiple > MAX_LINE_SPACING {
            return Err(DocxError::InvalidMeasurement {
                attribute: "line spacing",
                value: multiple,
            });
        }
        self.edit_mut().line = Some((multiple * LINE_UNITS_PER_MULTIPLE).round() as i32);
        Ok(())
    }

    fn set_space_before(&mut self, inches: f64) -> Result<(), DocxError> {
        check_length("space before", inches)?;
        self.edit_mut().space_before = Some(inches_to_twips(inches));
        Ok(())
    }

    fn set_space_after(&mut self, inches: f64) -> Result<(), DocxError> {
        check_length("space after", inches)?;
        self.edit_mut().space_after = Some(inches_to_twips(inches));
        Ok(())
    }
}

fn check_length(attribute: &'static str, inches: f64) -> Result<(), DocxError> {
    if inches.is_finite() && (0.0..=MAX_LENGTH_INCHES).contains(&inches) {
        Ok(())
    } else {
        Err(DocxError::InvalidMeasurement {
            attribute,
            value: inches,
        })
    }
}

/// `w:left`, or its bidi-aware alias `w:start`, of the paragraph's `w:ind`.
fn read_left_indent(properties: &[Property]) -> Option<i32> {
    properties
        .iter()
        .find(|p| p.name == "w:ind")
        .and_then(Property::element)
        .and_then(|e| get_attr_i32(e, b"w:left").or_else(|| get_attr_i32(e, b"w:start")))
}

fn tab_element(stop: &TabStop) -> BytesStart<'static> {
    let alignment = match stop.alignment {
        TabAlignment::Left => "left",
        TabAlignment::Center => "center",
        TabAlignment::Right => "right",
        TabAlignment::Decimal => "decimal",
    };
    let leader = match stop.leader {
        TabLeader::None => "none",
        TabLeader::Dotted => "dot",
    };
    let position = inches_to_twips(stop.position).to_string();

    let mut element = BytesStart::new("w:tab");
    element.push_attribute(("w:val", alignment));
    element.push_attribute(("w:leader", leader));
    element.push_attribute(("w:pos", position.as_str()));
    element
}

/// Concatenated run text: `w:t` content, `w:tab` as `\t`, `w:br`/`w:cr` as `\n`.
fn collect_text(content: &[Event<'static>]) -> String {
    let mut text = String::new();
    let mut hidden_depth = 0usize;
    let mut in_text = false;

    for event in content {
        match event {
            Event::Start(e) => {
                let name = e.name();
                if hidden_depth > 0 || is_hidden_text_container(name.as_ref()) {
                    hidden_depth += 1;
                } else if name.as_ref() == b"w:t" {
                    in_text = true;
                }
            }
            Event::End(e) => {
                if hidden_depth > 0 {
                    hidden_depth -= 1;
                } else if e.name().as_ref() == b"w:t" {
                    in_text = false;
                }
            }
            Event::Empty(e) if hidden_depth == 0 => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text && hidden_depth == 0 => match e.unescape() {
                Ok(unescaped) => text.push_str(&unescaped),
                Err(err) => {
                    log::debug!("Keeping raw text after unescape failure: {err}");
                    text.push_str(&String::from_utf8_lossy(e));
                }
            },
            Event::CData(e) if in_text && hidden_depth == 0 => {
                text.push_str(&String::from_utf8_lossy(e));
            }
            _ => {}
        }
    }

    text
}

/// The `w:rPr` of the first run that is a direct child of the paragraph.
fn first_run_properties(content: &[Event<'static>]) -> Vec<Event<'static>> {
    let mut depth = 0usize;
    for (i, event) in content.iter().enumerate() {
        match event {
            Event::Start(e) if depth == 0 && e.name().as_ref() == b"w:r" => {
                return run_properties_at(&content[i + 1..]);
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Vec::new()
}

fn run_properties_at(run: &[Event<'static>]) -> Vec<Event<'static>> {
    match run.first() {
        Some(Event::Empty(e)) if e.name().as_ref() == b"w:rPr" => vec![run[0].clone()],
        Some(Event::Start(e)) if e.name().as_ref() == b"w:rPr" => {
            let mut depth = 0usize;
            let mut events = Vec::new();
            for event in run {
                events.push(event.clone());
                match event {
                    Event::Start(_) => depth += 1,
                    Event::End(_) => {
                        depth -= 1;
                        if depth == 0 {
                            return events;
                        }
                    }
                    _ => {}
                }
            }
            events
        }
        _ => Vec::new(),
    }
}

fn write_all(
    writer: &mut Writer<Vec<u8>>,
    events: &[Event<'static>],
) -> Result<(), quick_xml::Error> {
    for event in events {
        writer.write_event(event)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use tocfmt_core::{process_paragraph, EntryOutcome, LayoutConfig};

    fn parse(xml: &str) -> Paragraph {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        let mut events = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Eof => break,
                event => events.push(event.into_owned()),
            }
        }
        Paragraph::from_events(events)
    }

    fn render(paragraph: &Paragraph) -> String {
        let mut writer = Writer::new(Vec::new());
        paragraph.write_to(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    const INDENTED: &str = concat!(
        r#"<w:p w:rsidR="00A1"><w:pPr><w:pStyle w:val="TOC2"/><w:ind w:left="720" w:hanging="360"/>"#,
        r#"<w:jc w:val="left"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Background </w:t></w:r>"#,
        r#"<w:r><w:t xml:space="preserve">.... iii</w:t></w:r></w:p>"#
    );

    #[test]
    fn test_reads_text_and_indent() {
        let paragraph = parse(INDENTED);
        assert_eq!(paragraph.text(), "Background .... iii");
        assert_eq!(paragraph.left_indent(), Some(0.5));
        assert!(!paragraph.is_modified());
    }

    #[test]
    fn test_text_with_tabs_breaks_and_entities() {
        let paragraph = parse(concat!(
            r#"<w:p><w:r><w:tab/><w:t>R&amp;D</w:t><w:br/><w:t>costs</w:t></w:r>"#,
            r#"<w:del><w:r><w:delText>gone</w:delText></w:r></w:del></w:p>"#
        ));
        assert_eq!(paragraph.text(), "\tR&D\ncosts");
        assert_eq!(paragraph.left_indent(), None);
    }

    #[test]
    fn test_text_box_content_is_not_paragraph_text() {
        let paragraph = parse(concat!(
            r#"<w:p><w:r><w:t>Visible</w:t></w:r><w:r><w:pict><w:txbxContent>"#,
            r#"<w:p><w:r><w:t>Boxed</w:t></w:r></w:p></w:txbxContent></w:pict></w:r></w:p>"#
        ));
        assert_eq!(paragraph.text(), "Visible");
    }

    #[test]
    fn test_start_attribute_is_read_as_left_indent() {
        let paragraph = parse(r#"<w:p><w:pPr><w:ind w:start="1440"/></w:pPr></w:p>"#);
        assert_eq!(paragraph.left_indent(), Some(1.0));
    }

    #[test]
    fn test_unmodified_paragraph_is_written_verbatim() {
        let paragraph = parse(INDENTED);
        assert_eq!(render(&paragraph), INDENTED);
    }

    #[test]
    fn test_rewrite_keeps_schema_order() {
        let mut paragraph = parse(INDENTED);
        paragraph.set_text("Background\tiii").unwrap();
        paragraph.set_left_indent(0.5).unwrap();
        paragraph.set_first_line_indent(0.0).unwrap();
        paragraph.clear_tab_stops().unwrap();
        paragraph
            .add_tab_stop(TabStop {
                position: 6.5,
                alignment: TabAlignment::Right,
                leader: TabLeader::Dotted,
            })
            .unwrap();
        paragraph.set_line_spacing(1.0).unwrap();
        paragraph.set_space_after(0.0).unwrap();
        paragraph.set_space_before(0.0).unwrap();

        let xml = render(&paragraph);
        let expected = concat!(
            r#"<w:p w:rsidR="00A1"><w:pPr><w:pStyle w:val="TOC2"/>"#,
            r#"<w:tabs><w:tab w:val="right" w:leader="dot" w:pos="9360"/></w:tabs>"#,
            r#"<w:spacing w:before="0" w:after="0" w:line="240" w:lineRule="auto"/>"#,
            r#"<w:ind w:left="720" w:firstLine="0"/><w:jc w:val="left"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Background</w:t><w:tab/>"#,
            r#"<w:t xml:space="preserve">iii</w:t></w:r></w:p>"#
        );
        assert_eq!(xml, expected);

        let reparsed = parse(&xml);
        assert_eq!(reparsed.text(), "Background\tiii");
        assert_eq!(reparsed.left_indent(), Some(0.5));
    }

    #[test]
    fn test_properties_created_when_missing() {
        let mut paragraph = parse(r#"<w:p><w:r><w:t>Methods 4</w:t></w:r></w:p>"#);
        paragraph.set_left_indent(0.25).unwrap();
        let xml = render(&paragraph);
        assert_eq!(
            xml,
            r#"<w:p><w:pPr><w:ind w:left="360"/></w:pPr><w:r><w:t>Methods 4</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_clear_tab_stops_removes_tabs_element() {
        let mut paragraph = parse(concat!(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="4320"/></w:tabs></w:pPr>"#,
            r#"<w:r><w:t>LIST OF TABLES</w:t></w:r></w:p>"#
        ));
        paragraph.clear_tab_stops().unwrap();
        let xml = render(&paragraph);
        assert_eq!(xml, r#"<w:p><w:pPr></w:pPr><w:r><w:t>LIST OF TABLES</w:t></w:r></w:p>"#);
    }

    #[test]
    fn test_add_tab_stop_without_clear_appends() {
        let mut paragraph = parse(concat!(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="4320"/></w:tabs></w:pPr>"#,
            r#"<w:r><w:t>x</w:t></w:r></w:p>"#
        ));
        paragraph
            .add_tab_stop(TabStop {
                position: 1.0,
                alignment: TabAlignment::Center,
                leader: TabLeader::None,
            })
            .unwrap();
        let xml = render(&paragraph);
        assert!(xml.contains(concat!(
            r#"<w:tabs><w:tab w:val="left" w:pos="4320"/>"#,
            r#"<w:tab w:val="center" w:leader="none" w:pos="1440"/></w:tabs>"#
        )));
    }

    #[test]
    fn test_invalid_measurements_are_rejected() {
        let mut paragraph = parse(INDENTED);
        assert!(matches!(
            paragraph.set_left_indent(f64::NAN),
            Err(DocxError::InvalidMeasurement {
                attribute: "left indent",
                ..
            })
        ));
        assert!(paragraph.set_space_before(-1.0).is_err());
        assert!(paragraph.set_line_spacing(0.0).is_err());
        assert!(paragraph
            .add_tab_stop(TabStop {
                position: 30.0,
                alignment: TabAlignment::Right,
                leader: TabLeader::Dotted,
            })
            .is_err());
        assert!(!paragraph.is_modified());
    }

    #[test]
    fn test_discard_edits_restores_original_paragraph() {
        let mut paragraph = parse(INDENTED);
        paragraph.set_text("Background\tiii").unwrap();
        paragraph.set_left_indent(2.0).unwrap();
        paragraph.clear_tab_stops().unwrap();

        paragraph.discard_edits();

        assert!(!paragraph.is_modified());
        assert_eq!(paragraph.text(), "Background .... iii");
        assert_eq!(paragraph.left_indent(), Some(0.5));
        assert_eq!(render(&paragraph), INDENTED);
    }

    #[test]
    fn test_refused_tab_stop_leaves_only_plain_text() {
        let mut paragraph = parse(INDENTED);
        let config = LayoutConfig {
            tab_position: 30.0,
            ..LayoutConfig::default()
        };

        let outcome = process_paragraph(&mut paragraph, &config);

        assert!(matches!(
            outcome,
            EntryOutcome::Degraded { ref text, .. } if text == "Background\tiii"
        ));
        assert_eq!(
            render(&paragraph),
            concat!(
                r#"<w:p w:rsidR="00A1"><w:pPr><w:pStyle w:val="TOC2"/>"#,
                r#"<w:ind w:left="720" w:hanging="360"/><w:jc w:val="left"/></w:pPr>"#,
                r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Background</w:t><w:tab/>"#,
                r#"<w:t xml:space="preserve">iii</w:t></w:r></w:p>"#
            )
        );
    }

    #[test]
    fn test_empty_paragraph() {
        let mut paragraph = parse("<w:p/>");
        assert_eq!(paragraph.text(), "");
        assert_eq!(render(&paragraph), "<w:p/>");
        paragraph.set_text("Title").unwrap();
        assert_eq!(
            render(&paragraph),
            r#"<w:p><w:r><w:t xml:space="preserve">Title</w:t></w:r></w:p>"#
        );
    }
}
