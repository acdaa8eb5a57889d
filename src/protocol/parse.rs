//! Line parser for the annotation customization instruction language.
//!
//! Every line of an instruction file is classified by a fixed-width
//! six-character keyword prefix and parsed into a typed instruction. All
//! field-level validation happens here: index syntax, bbox literal shape,
//! and registry membership of every name, so the driver only ever sees
//! well-typed instructions. Errors report the 1-based line number.

use crate::error::CurateError;
use crate::store::{ClassRegistry, PredicateRegistry};
use crate::vr::{BBox, ClassId, PredicateId, VrObject, VrRecord};

/// Extensions an image name may carry.
const IMAGE_EXTENSIONS: [&str; 2] = [".jpg", ".png"];

/// Number of leading characters of an image name that must be digits.
/// Every image name in the dataset starts with its numeric prefix, so a
/// non-numeric start signals a mistyped name.
const IMAGE_NAME_DIGIT_PREFIX: usize = 5;

/// Field-3 marker on an `imname` line requesting image removal.
const REMOVE_IMAGE_MARKER: &str = "rimxxx";

/// Width of the keyword prefix that classifies a line.
const KEYWORD_WIDTH: usize = 6;

/// One classified line of an instruction file.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedLine {
    /// An empty line; no effect.
    Blank,
    /// A `#` comment line; no effect.
    Comment,
    /// An `imname` declaration opening (or removing) an image block.
    Image(ImageDecl),
    /// A VR-level instruction inside an image block.
    Vr(VrInstruction),
}

/// An `imname` line: the image whose annotations the following
/// instructions edit, or an immediate removal of that image's entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDecl {
    pub name: String,
    pub remove: bool,
}

/// A typed VR-level instruction.
///
/// Change and remove instructions carry the anchor string: the rendered
/// `('subject', 'predicate', 'object')` tuple the author expected to find
/// at the target index. The driver compares it against live data before
/// mutating anything.
#[derive(Clone, Debug, PartialEq)]
pub enum VrInstruction {
    /// `cvrsoc`: change the subject's object class.
    ChangeSubjectClass {
        index: usize,
        anchor: String,
        class: ClassId,
    },
    /// `cvrsbb`: change the subject's bounding box.
    ChangeSubjectBBox {
        index: usize,
        anchor: String,
        bbox: BBox,
    },
    /// `cvrpxx`: change the predicate.
    ChangePredicate {
        index: usize,
        anchor: String,
        predicate: PredicateId,
    },
    /// `cvrooc`: change the object's object class.
    ChangeObjectClass {
        index: usize,
        anchor: String,
        class: ClassId,
    },
    /// `cvrobb`: change the object's bounding box.
    ChangeObjectBBox {
        index: usize,
        anchor: String,
        bbox: BBox,
    },
    /// `avrxxx`: append a fully formed new VR record.
    Append { record: VrRecord },
    /// `rvrxxx`: remove the record at the target index.
    Remove { index: usize, anchor: String },
}

impl VrInstruction {
    /// The instruction's keyword, for diagnostics.
    pub fn keyword(&self) -> &'static str {
        match self {
            VrInstruction::ChangeSubjectClass { .. } => "cvrsoc",
            VrInstruction::ChangeSubjectBBox { .. } => "cvrsbb",
            VrInstruction::ChangePredicate { .. } => "cvrpxx",
            VrInstruction::ChangeObjectClass { .. } => "cvrooc",
            VrInstruction::ChangeObjectBBox { .. } => "cvrobb",
            VrInstruction::Append { .. } => "avrxxx",
            VrInstruction::Remove { .. } => "rvrxxx",
        }
    }

    /// True for the five `cvr...` single-field change instructions.
    pub fn is_change(&self) -> bool {
        !matches!(
            self,
            VrInstruction::Append { .. } | VrInstruction::Remove { .. }
        )
    }
}

/// Parses one whitespace-trimmed instruction line.
pub fn parse_line(
    line_num: usize,
    line: &str,
    objects: &ClassRegistry,
    predicates: &PredicateRegistry,
) -> Result<ParsedLine, CurateError> {
    if line.is_empty() {
        return Ok(ParsedLine::Blank);
    }
    if line.starts_with('#') {
        return Ok(ParsedLine::Comment);
    }

    let keyword = line.get(..KEYWORD_WIDTH).ok_or_else(|| {
        CurateError::parse(line_num, format!("line type not recognised: '{}'", line))
    })?;

    let tokens = tokenize(line);

    match keyword {
        "imname" => parse_image_line(line_num, &tokens).map(ParsedLine::Image),
        "cvrsoc" => {
            let (index, anchor) = parse_target(line_num, "cvrsoc", &tokens)?;
            let class = require_class(line_num, objects, &tokens[3])?;
            Ok(ParsedLine::Vr(VrInstruction::ChangeSubjectClass {
                index,
                anchor,
                class,
            }))
        }
        "cvrsbb" => {
            let (index, anchor) = parse_target(line_num, "cvrsbb", &tokens)?;
            let bbox = parse_bbox_literal(line_num, &tokens[3])?;
            Ok(ParsedLine::Vr(VrInstruction::ChangeSubjectBBox {
                index,
                anchor,
                bbox,
            }))
        }
        "cvrpxx" => {
            let (index, anchor) = parse_target(line_num, "cvrpxx", &tokens)?;
            let predicate = require_predicate(line_num, predicates, &tokens[3])?;
            Ok(ParsedLine::Vr(VrInstruction::ChangePredicate {
                index,
                anchor,
                predicate,
            }))
        }
        "cvrooc" => {
            let (index, anchor) = parse_target(line_num, "cvrooc", &tokens)?;
            let class = require_class(line_num, objects, &tokens[3])?;
            Ok(ParsedLine::Vr(VrInstruction::ChangeObjectClass {
                index,
                anchor,
                class,
            }))
        }
        "cvrobb" => {
            let (index, anchor) = parse_target(line_num, "cvrobb", &tokens)?;
            let bbox = parse_bbox_literal(line_num, &tokens[3])?;
            Ok(ParsedLine::Vr(VrInstruction::ChangeObjectBBox {
                index,
                anchor,
                bbox,
            }))
        }
        "avrxxx" => parse_append(line_num, &tokens, objects, predicates)
            .map(|record| ParsedLine::Vr(VrInstruction::Append { record })),
        "rvrxxx" => {
            expect_keyword(line_num, "rvrxxx", &tokens)?;
            if tokens.len() < 3 {
                return Err(malformed(line_num, "rvrxxx"));
            }
            let index = parse_index(line_num, "rvrxxx", &tokens[1])?;
            Ok(ParsedLine::Vr(VrInstruction::Remove {
                index,
                anchor: tokens[2].clone(),
            }))
        }
        _ => Err(CurateError::parse(
            line_num,
            format!("line type not recognised: '{}'", keyword),
        )),
    }
}

/// Splits a line on the `;` delimiter and trims each field.
fn tokenize(line: &str) -> Vec<String> {
    line.split(';').map(|t| t.trim().to_string()).collect()
}

fn malformed(line_num: usize, keyword: &str) -> CurateError {
    CurateError::parse(line_num, format!("'{}' instruction is malformed", keyword))
}

/// Checks that the full first token is exactly the keyword, so that
/// e.g. `cvrsocx; ...` is rejected even though its prefix matches.
fn expect_keyword(line_num: usize, keyword: &str, tokens: &[String]) -> Result<(), CurateError> {
    if tokens[0] != keyword {
        return Err(CurateError::parse(
            line_num,
            format!("line type not recognised: '{}'", tokens[0]),
        ));
    }
    Ok(())
}

/// Parses the shared `<index>; <anchor tuple>` head of `cvr...` lines.
fn parse_target(
    line_num: usize,
    keyword: &str,
    tokens: &[String],
) -> Result<(usize, String), CurateError> {
    expect_keyword(line_num, keyword, tokens)?;
    if tokens.len() < 4 {
        return Err(malformed(line_num, keyword));
    }
    let index = parse_index(line_num, keyword, &tokens[1])?;
    Ok((index, tokens[2].clone()))
}

/// Parses a target index: a plain run of ASCII digits, no sign.
fn parse_index(line_num: usize, keyword: &str, token: &str) -> Result<usize, CurateError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CurateError::parse(
            line_num,
            format!("vr index for '{}' instruction not obtained", keyword),
        ));
    }
    token
        .parse::<usize>()
        .map_err(|_| malformed(line_num, keyword))
}

fn parse_image_line(line_num: usize, tokens: &[String]) -> Result<ImageDecl, CurateError> {
    if tokens[0] != "imname" {
        return Err(CurateError::parse(
            line_num,
            format!("line type not recognised: '{}'", tokens[0]),
        ));
    }
    if tokens.len() < 2 {
        return Err(CurateError::parse(line_num, "missing image name"));
    }

    let name = tokens[1].clone();
    if !IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return Err(CurateError::parse(
            line_num,
            format!("bad image name: '{}'", name),
        ));
    }
    let digits_ok = name.len() >= IMAGE_NAME_DIGIT_PREFIX
        && name.as_bytes()[..IMAGE_NAME_DIGIT_PREFIX]
            .iter()
            .all(u8::is_ascii_digit);
    if !digits_ok {
        return Err(CurateError::parse(
            line_num,
            format!("bad image name: '{}'", name),
        ));
    }

    let remove = match tokens.get(2).map(String::as_str) {
        None | Some("") => false,
        Some(REMOVE_IMAGE_MARKER) => true,
        Some(other) => {
            return Err(CurateError::parse(
                line_num,
                format!("image instruction not recognised: '{}'", other),
            ));
        }
    };

    Ok(ImageDecl { name, remove })
}

/// Parses an `avrxxx` line into a fully formed new VR record.
fn parse_append(
    line_num: usize,
    tokens: &[String],
    objects: &ClassRegistry,
    predicates: &PredicateRegistry,
) -> Result<VrRecord, CurateError> {
    expect_keyword(line_num, "avrxxx", tokens)?;
    if tokens.len() < 6 {
        return Err(malformed(line_num, "avrxxx"));
    }

    let subject_class = require_class(line_num, objects, &tokens[1])?;
    let subject_bbox = parse_bbox_literal(line_num, &tokens[2])?;
    let predicate = require_predicate(line_num, predicates, &tokens[3])?;
    let object_class = require_class(line_num, objects, &tokens[4])?;
    let object_bbox = parse_bbox_literal(line_num, &tokens[5])?;

    Ok(VrRecord::new(
        VrObject::new(subject_class, subject_bbox),
        predicate,
        VrObject::new(object_class, object_bbox),
    ))
}

/// Parses a bbox literal of the form `[a, b, c, d]` with exactly four
/// non-negative integers.
fn parse_bbox_literal(line_num: usize, token: &str) -> Result<BBox, CurateError> {
    let invalid = || CurateError::parse(line_num, format!("invalid bbox specification: '{}'", token));

    let inner = token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(invalid)?;

    let elems: Vec<&str> = inner.split(',').map(str::trim).collect();
    if elems.len() != 4 {
        return Err(invalid());
    }

    let mut coords = [0u32; 4];
    for (slot, elem) in coords.iter_mut().zip(&elems) {
        if elem.is_empty() || !elem.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        *slot = elem.parse::<u32>().map_err(|_| invalid())?;
    }

    Ok(BBox::from(coords))
}

fn require_class(
    line_num: usize,
    objects: &ClassRegistry,
    name: &str,
) -> Result<ClassId, CurateError> {
    objects.id_of(name).ok_or_else(|| {
        CurateError::reference(line_num, format!("invalid object class name: '{}'", name))
    })
}

fn require_predicate(
    line_num: usize,
    predicates: &PredicateRegistry,
    name: &str,
) -> Result<PredicateId, CurateError> {
    predicates.id_of(name).ok_or_else(|| {
        CurateError::reference(line_num, format!("invalid predicate name: '{}'", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Registry;

    fn registries() -> (ClassRegistry, PredicateRegistry) {
        let objects = Registry::from_names(vec![
            "person".into(),
            "horse".into(),
            "hat".into(),
        ]);
        let predicates = Registry::from_names(vec!["on".into(), "wear".into()]);
        (objects, predicates)
    }

    fn parse(line: &str) -> Result<ParsedLine, CurateError> {
        let (objects, predicates) = registries();
        parse_line(7, line, &objects, &predicates)
    }

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(parse("").unwrap(), ParsedLine::Blank);
        assert_eq!(parse("# a note").unwrap(), ParsedLine::Comment);
    }

    #[test]
    fn image_declaration() {
        let parsed = parse("imname; 00123.jpg").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Image(ImageDecl {
                name: "00123.jpg".into(),
                remove: false,
            })
        );
    }

    #[test]
    fn image_declaration_with_removal_marker() {
        let parsed = parse("imname; 00123.png; rimxxx").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Image(ImageDecl {
                name: "00123.png".into(),
                remove: true,
            })
        );
    }

    #[test]
    fn image_name_must_have_digit_prefix_and_known_extension() {
        assert!(matches!(
            parse("imname; horse.jpg"),
            Err(CurateError::Parse { line: 7, .. })
        ));
        assert!(matches!(
            parse("imname; 00123.gif"),
            Err(CurateError::Parse { .. })
        ));
        assert!(matches!(
            parse("imname; 00123.jpg; dropit"),
            Err(CurateError::Parse { .. })
        ));
    }

    #[test]
    fn change_subject_class() {
        let parsed = parse("cvrsoc; 2; ('person', 'on', 'horse'); hat").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Vr(VrInstruction::ChangeSubjectClass {
                index: 2,
                anchor: "('person', 'on', 'horse')".into(),
                class: ClassId::new(2),
            })
        );
    }

    #[test]
    fn change_predicate_checks_the_predicate_registry() {
        let parsed = parse("cvrpxx; 0; ('person', 'on', 'horse'); wear").unwrap();
        assert!(matches!(
            parsed,
            ParsedLine::Vr(VrInstruction::ChangePredicate { .. })
        ));
        // 'person' is an object class, not a predicate
        assert!(matches!(
            parse("cvrpxx; 0; ('person', 'on', 'horse'); person"),
            Err(CurateError::Reference { line: Some(7), .. })
        ));
    }

    #[test]
    fn change_bbox_parses_the_literal() {
        let parsed = parse("cvrobb; 1; ('person', 'on', 'horse'); [10, 20, 30, 40]").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Vr(VrInstruction::ChangeObjectBBox {
                index: 1,
                anchor: "('person', 'on', 'horse')".into(),
                bbox: BBox::new(10, 20, 30, 40),
            })
        );
    }

    #[test]
    fn append_builds_a_full_record() {
        let parsed =
            parse("avrxxx; person; [1, 2, 3, 4]; wear; hat; [5, 6, 7, 8]").unwrap();
        let ParsedLine::Vr(VrInstruction::Append { record }) = parsed else {
            panic!("expected append instruction");
        };
        assert_eq!(record.subject.category, ClassId::new(0));
        assert_eq!(record.subject.bbox, BBox::new(1, 2, 3, 4));
        assert_eq!(record.predicate, PredicateId::new(1));
        assert_eq!(record.object.category, ClassId::new(2));
        assert_eq!(record.object.bbox, BBox::new(5, 6, 7, 8));
    }

    #[test]
    fn remove_takes_index_and_anchor_only() {
        let parsed = parse("rvrxxx; 4; ('person', 'on', 'horse')").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Vr(VrInstruction::Remove {
                index: 4,
                anchor: "('person', 'on', 'horse')".into(),
            })
        );
    }

    #[test]
    fn unknown_keyword_is_a_parse_error_with_line_number() {
        let err = parse("xvrsoc; 1; x; y").unwrap_err();
        assert!(matches!(err, CurateError::Parse { line: 7, .. }));
    }

    #[test]
    fn short_garbage_line_is_a_parse_error() {
        assert!(matches!(parse("cvr"), Err(CurateError::Parse { .. })));
    }

    #[test]
    fn index_must_be_a_plain_digit_run() {
        assert!(matches!(
            parse("cvrsoc; +2; ('person', 'on', 'horse'); hat"),
            Err(CurateError::Parse { .. })
        ));
        assert!(matches!(
            parse("rvrxxx; two; ('person', 'on', 'horse')"),
            Err(CurateError::Parse { .. })
        ));
    }

    #[test]
    fn malformed_bbox_literals_are_rejected() {
        for bad in [
            "[1, 2, 3]",
            "[1, 2, 3, 4, 5]",
            "(1, 2, 3, 4)",
            "[1, 2, 3, -4]",
            "[1, 2, 3, 4.5]",
            "[a, b, c, d]",
            "1, 2, 3, 4",
        ] {
            let line = format!("cvrsbb; 0; ('person', 'on', 'horse'); {}", bad);
            assert!(
                matches!(parse(&line), Err(CurateError::Parse { .. })),
                "accepted bad bbox literal: {}",
                bad
            );
        }
    }

    #[test]
    fn missing_fields_are_parse_errors() {
        assert!(matches!(
            parse("cvrsoc; 2; ('person', 'on', 'horse')"),
            Err(CurateError::Parse { .. })
        ));
        assert!(matches!(
            parse("avrxxx; person; [1, 2, 3, 4]; wear; hat"),
            Err(CurateError::Parse { .. })
        ));
        assert!(matches!(parse("imname"), Err(CurateError::Parse { .. })));
    }

    #[test]
    fn unknown_names_are_reference_errors() {
        assert!(matches!(
            parse("cvrsoc; 2; ('person', 'on', 'horse'); zebra"),
            Err(CurateError::Reference { line: Some(7), .. })
        ));
        assert!(matches!(
            parse("avrxxx; zebra; [1, 2, 3, 4]; wear; hat; [5, 6, 7, 8]"),
            Err(CurateError::Reference { .. })
        ));
    }
}
