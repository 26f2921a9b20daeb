//! Module boundary extraction from bundled JavaScript, using oxc.
//!
//! Recognizes the webpack chunk registration shape:
//!
//! ```text
//! (self.webpackChunk = self.webpackChunk || []).push([
//!     [chunkIds],
//!     { "./src/a.js": function (module, exports, require) { ... }, ... }
//! ]);
//! ```
//!
//! i.e. the first object literal that is an element of an array literal passed
//! as an argument to a call forming a top-level expression statement. Each
//! property of that object is one module; its interval runs from the first
//! statement of the function body to the end of the last one (directives
//! included), or covers the whole body span when the body is empty.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, ArrayExpressionElement, Expression, FunctionBody, ObjectExpression,
    ObjectPropertyKind, Program, PropertyKey, Statement,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use tracing::debug;

use crate::error::{BundlecovError, BundlecovResult};
use crate::interval::ModuleInterval;
use crate::profile::CoverageAsset;

/// Converts UTF-8 byte offsets (oxc spans) into UTF-16 code unit offsets
/// (what JS profilers report).
///
/// Only non-ASCII characters are recorded, so pure ASCII bundles cost nothing.
#[derive(Debug, Default)]
pub struct OffsetMap {
    /// (byte offset just past a non-ASCII char, cumulative byte surplus up to it)
    checkpoints: Vec<(usize, usize)>,
}

impl OffsetMap {
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self::default();
        }

        let mut surplus = 0;
        let mut checkpoints = Vec::new();
        for (offset, ch) in text.char_indices() {
            if !ch.is_ascii() {
                surplus += ch.len_utf8() - ch.len_utf16();
                checkpoints.push((offset + ch.len_utf8(), surplus));
            }
        }
        Self { checkpoints }
    }

    /// Maps a byte offset lying on a char boundary to a UTF-16 offset.
    pub fn to_utf16(&self, byte_offset: usize) -> usize {
        let idx = self
            .checkpoints
            .partition_point(|(end, _)| *end <= byte_offset);
        match idx {
            0 => byte_offset,
            _ => byte_offset - self.checkpoints[idx - 1].1,
        }
    }
}

/// Extracts module intervals from bundle text.
///
/// Returns `Ok(None)` when the text holds no module registration object.
pub fn extract_modules(text: &str) -> BundlecovResult<Option<Vec<ModuleInterval>>> {
    extract_from(text, "<inline>")
}

/// Extracts module intervals from a coverage asset, using its URL for errors.
pub fn extract_asset_modules(asset: &CoverageAsset) -> BundlecovResult<Option<Vec<ModuleInterval>>> {
    extract_from(&asset.text, &asset.url)
}

fn extract_from(text: &str, origin: &str) -> BundlecovResult<Option<Vec<ModuleInterval>>> {
    let allocator = Allocator::default();

    // Bundles are usually classic scripts; ESM chunks need module parsing.
    let mut parsed = Parser::new(&allocator, text, SourceType::cjs()).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        let first_errors = parsed
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>();
        debug!(asset = %origin, "script parse failed, retrying as module");

        parsed = Parser::new(&allocator, text, SourceType::mjs()).parse();
        if parsed.panicked || !parsed.errors.is_empty() {
            let message = if first_errors.is_empty() {
                "parser aborted".to_string()
            } else {
                first_errors.join("\n")
            };
            return Err(BundlecovError::parse(origin, message));
        }
    }

    let Some(registry) = find_registry(&parsed.program) else {
        return Ok(None);
    };

    let offsets = OffsetMap::new(text);
    let mut modules = Vec::with_capacity(registry.properties.len());

    for property in &registry.properties {
        let ObjectPropertyKind::ObjectProperty(property) = property else {
            debug!(asset = %origin, "skipping spread in module registry");
            continue;
        };
        let Some(name) = key_name(&property.key) else {
            debug!(asset = %origin, "skipping computed module key");
            continue;
        };
        debug!(module = %name, "processing module");

        let Some(body) = function_body(&property.value) else {
            debug!(module = %name, "module value is not a function, skipping");
            continue;
        };

        let (start, end) = body_interval(body);
        modules.push(ModuleInterval::new(
            name,
            offsets.to_utf16(start as usize),
            offsets.to_utf16(end as usize),
        ));
    }

    Ok(Some(modules))
}

/// Finds the module registration object literal, in document order.
fn find_registry<'p, 'a>(program: &'p Program<'a>) -> Option<&'p ObjectExpression<'a>> {
    program.body.iter().find_map(|statement| {
        let Statement::ExpressionStatement(statement) = statement else {
            return None;
        };
        let Expression::CallExpression(call) = unparenthesize(&statement.expression) else {
            return None;
        };
        call.arguments.iter().find_map(|argument| {
            let Argument::ArrayExpression(array) = argument else {
                return None;
            };
            array.elements.iter().find_map(|element| match element {
                ArrayExpressionElement::ObjectExpression(object) => Some(&**object),
                _ => None,
            })
        })
    })
}

fn unparenthesize<'p, 'a>(mut expression: &'p Expression<'a>) -> &'p Expression<'a> {
    while let Expression::ParenthesizedExpression(inner) = expression {
        expression = &inner.expression;
    }
    expression
}

fn key_name(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StringLiteral(lit) => Some(lit.value.as_str().to_string()),
        PropertyKey::StaticIdentifier(ident) => Some(ident.name.as_str().to_string()),
        PropertyKey::NumericLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

fn function_body<'p, 'a>(value: &'p Expression<'a>) -> Option<&'p FunctionBody<'a>> {
    match unparenthesize(value) {
        Expression::FunctionExpression(function) => function.body.as_deref(),
        Expression::ArrowFunctionExpression(arrow) => Some(&*arrow.body),
        _ => None,
    }
}

/// Byte interval covered by a function body's contents.
fn body_interval(body: &FunctionBody<'_>) -> (u32, u32) {
    let first = body
        .directives
        .first()
        .map(|d| d.span.start)
        .into_iter()
        .chain(body.statements.first().map(|s| s.span().start))
        .min();
    let last = body
        .statements
        .last()
        .map(|s| s.span().end)
        .into_iter()
        .chain(body.directives.last().map(|d| d.span.end))
        .max();

    match (first, last) {
        (Some(start), Some(end)) => (start, end),
        _ => (body.span.start, body.span.end),
    }
}
