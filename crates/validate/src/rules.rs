use docgate_core::{CategoryDescriptor, RejectionReason, Thresholds};
use docgate_ocr::Extraction;

use crate::keywords::{has_id_marker, has_institution_marker};

/// Everything a heuristic rule may look at.
pub struct RuleContext<'a> {
    pub text: &'a str,
    /// Characters, not bytes.
    pub text_len: usize,
    pub face_count: usize,
    pub width: u32,
    pub height: u32,
    pub category: &'a CategoryDescriptor,
    pub thresholds: &'a Thresholds,
    pub institution_marker: bool,
    pub id_marker: bool,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        extraction: &'a Extraction,
        width: u32,
        height: u32,
        category: &'a CategoryDescriptor,
        thresholds: &'a Thresholds,
    ) -> Self {
        Self {
            text: &extraction.text,
            text_len: extraction.text_len(),
            face_count: extraction.face_count,
            width,
            height,
            category,
            thresholds,
            institution_marker: has_institution_marker(&extraction.text),
            id_marker: has_id_marker(&extraction.text),
        }
    }

    fn has_face(&self) -> bool {
        self.face_count > 0
    }

    /// width / height
    fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// One heuristic rejection rule. `applies` returning true rejects with `reason`.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&RuleContext) -> bool,
    pub reason: RejectionReason,
}

/// The heuristic rules in evaluation order. The first one that applies decides.
pub fn rejection_rules() -> Vec<Rule> {
    vec![
        Rule { name: "group-photo", applies: group_photo, reason: RejectionReason::GroupPhotoDetected },
        Rule { name: "empty-signal", applies: empty_signal, reason: RejectionReason::EmptyExtraction },
        Rule { name: "selfie", applies: selfie, reason: RejectionReason::SelfieDetected },
        Rule { name: "portrait-selfie", applies: portrait_selfie, reason: RejectionReason::PortraitSelfie },
        Rule { name: "profile-photo", applies: profile_photo, reason: RejectionReason::ProfilePhoto },
        Rule {
            name: "non-document-shape",
            applies: non_document_shape,
            reason: RejectionReason::NonDocumentShape,
        },
        Rule {
            name: "no-academic-signal",
            applies: no_academic_signal,
            reason: RejectionReason::NoAcademicSignal,
        },
    ]
}

pub fn first_applying<'r>(rules: &'r [Rule], ctx: &RuleContext) -> Option<&'r Rule> {
    rules.iter().find(|rule| (rule.applies)(ctx))
}

// ── Rules ────────────────────────────────────────────────────────────────────

pub fn group_photo(ctx: &RuleContext) -> bool {
    ctx.face_count > ctx.thresholds.max_faces
}

/// Identity cards carry little text, so their floor is lower and an ID number
/// or ID keyword waives it.
pub fn empty_signal(ctx: &RuleContext) -> bool {
    if ctx.category.is_identity_card() {
        !ctx.id_marker && ctx.text_len < ctx.thresholds.id_card_min_text_chars
    } else {
        ctx.text_len < ctx.thresholds.min_text_chars
    }
}

/// A printed photo on an ID card is expected when the card text backs it up.
pub fn selfie(ctx: &RuleContext) -> bool {
    if ctx.category.is_identity_card() && (ctx.institution_marker || ctx.id_marker) {
        return false;
    }
    ctx.has_face() && ctx.text_len < ctx.thresholds.selfie_max_text_chars
}

pub fn portrait_selfie(ctx: &RuleContext) -> bool {
    ctx.has_face() && ctx.height as f32 / ctx.width.max(1) as f32 > ctx.thresholds.portrait_min_aspect
}

pub fn profile_photo(ctx: &RuleContext) -> bool {
    ctx.has_face()
        && (ctx.aspect() - 1.0).abs() <= ctx.thresholds.square_aspect_tolerance
        && ctx.text_len < ctx.thresholds.profile_max_text_chars
}

pub fn non_document_shape(ctx: &RuleContext) -> bool {
    let band = if ctx.category.is_identity_card() {
        ctx.thresholds.card_aspect
    } else {
        ctx.thresholds.document_aspect
    };
    !band.contains(ctx.aspect())
}

pub fn no_academic_signal(ctx: &RuleContext) -> bool {
    ctx.text_len > ctx.thresholds.academic_signal_min_chars && !ctx.institution_marker
}
