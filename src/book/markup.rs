//! Block-level reader for chapter bodies.
//!
//! Recognizes `<p>` and `<h1>`..`<h6>`. Inline tags are dropped, comments
//! are skipped, entities are decoded. Loose text between blocks becomes a
//! paragraph per blank-line run.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::Block;

enum BlockKind {
    Paragraph,
    Heading(u8),
}

struct OpenBlock {
    tag: String,
    kind: BlockKind,
    text: String,
}

pub fn parse_markup(markup: &str) -> Vec<Block> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(false);
    // Chapter HTML is not XML: unclosed <p>, stray end tags
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut blocks = Vec::new();
    let mut loose = String::new();
    let mut open: Option<OpenBlock> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = tag_name(e.name().as_ref());
                if let Some(kind) = block_kind(&tag) {
                    // A new block implicitly closes the previous one
                    finish(&mut open, &mut blocks);
                    flush_loose(&mut loose, &mut blocks);
                    open = Some(OpenBlock { tag, kind, text: String::new() });
                } else if tag == "br" {
                    text_sink(&mut open, &mut loose).push(' ');
                }
            }
            Ok(Event::Empty(e)) => {
                if tag_name(e.name().as_ref()) == "br" {
                    text_sink(&mut open, &mut loose).push(' ');
                }
            }
            Ok(Event::End(e)) => {
                let tag = tag_name(e.name().as_ref());
                if open.as_ref().is_some_and(|block| block.tag == tag) {
                    finish(&mut open, &mut blocks);
                }
            }
            Ok(Event::Text(e)) => match e.decode() {
                Ok(text) => text_sink(&mut open, &mut loose).push_str(&text),
                Err(err) => tracing::warn!("undecodable text in chapter markup: {}", err),
            },
            Ok(Event::GeneralRef(e)) => match e.decode() {
                Ok(name) => text_sink(&mut open, &mut loose).push_str(&decode_entity(&name)),
                Err(err) => tracing::warn!("undecodable entity in chapter markup: {}", err),
            },
            Ok(Event::Eof) => break,
            // Comments, doctype, processing instructions
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    "chapter markup unreadable after byte {}: {}",
                    reader.buffer_position(),
                    err
                );
                break;
            }
        }
    }
    finish(&mut open, &mut blocks);
    flush_loose(&mut loose, &mut blocks);

    blocks
}

fn block_kind(tag: &str) -> Option<BlockKind> {
    match tag {
        "p" => Some(BlockKind::Paragraph),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => tag[1..].parse().ok().map(BlockKind::Heading),
        _ => None,
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

// HTML knows far more named entities than XML; unknown ones stay literal
fn decode_entity(name: &str) -> String {
    let reference = format!("&{};", name);
    html_escape::decode_html_entities(&reference).into_owned()
}

fn text_sink<'a>(open: &'a mut Option<OpenBlock>, loose: &'a mut String) -> &'a mut String {
    match open {
        Some(block) => &mut block.text,
        None => loose,
    }
}

fn finish(open: &mut Option<OpenBlock>, blocks: &mut Vec<Block>) {
    let Some(block) = open.take() else {
        return;
    };
    let text = collapse_whitespace(&block.text);
    if text.is_empty() {
        return;
    }
    blocks.push(match block.kind {
        BlockKind::Paragraph => Block::Paragraph(text),
        BlockKind::Heading(level) => Block::Heading { level, text },
    });
}

fn flush_loose(loose: &mut String, blocks: &mut Vec<Block>) {
    for chunk in loose.split("\n\n") {
        let text = collapse_whitespace(chunk);
        if !text.is_empty() {
            blocks.push(Block::Paragraph(text));
        }
    }
    loose.clear();
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
