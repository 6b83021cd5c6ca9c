//! Two-stage intent classification for career-counseling queries.
//!
//! Stage 1 decides the domain (career vs. general small talk), stage 2
//! picks the career sub-intent. The design is opt-out rather than opt-in:
//! career queries vastly outnumber chit-chat in production traffic, so
//! the default assumption is "career-related" and only queries that look
//! unambiguously like small talk are routed to the general path. This
//! keeps genuine career queries from being starved of retrieved context
//! just because they miss a keyword pattern.
//!
//! Classification is a total function: every string maps to a result,
//! garbled input degrades to low-confidence defaults, nothing errors.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use counsel_types::ClassifierSettings;

use crate::types::{ClassificationResult, Domain, Intent, Language};

/// A regex pattern bound to one intent in one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Intent this pattern votes for
    pub intent: Intent,

    /// Language the pattern is phrased in
    pub language: Language,

    /// Regular expression, matched against the lower-cased query
    pub pattern: String,
}

/// A substring indicator bound to one intent in one language.
///
/// The softer fallback bank, consulted only when no regex pattern fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSpec {
    /// Intent this signal votes for
    pub intent: Intent,

    /// Language the phrase is written in
    pub language: Language,

    /// Phrase searched for as a substring of the lower-cased query
    pub phrase: String,
}

/// How ties between equally-scored intents are resolved.
///
/// The length heuristic is a placeholder policy; it is configurable
/// rather than hard-coded so a deployment can pin a fixed winner
/// instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum TieBreakPolicy {
    /// Short queries resolve to JobSearch, longer ones to
    /// PositionAnalysis.
    QueryLength {
        /// Boundary in words; queries under this count as short
        short_word_limit: usize,
    },

    /// Ties always resolve to the given intent.
    Fixed {
        /// Winning intent
        intent: Intent,
    },
}

impl Default for TieBreakPolicy {
    fn default() -> Self {
        TieBreakPolicy::QueryLength {
            short_word_limit: 8,
        }
    }
}

impl TieBreakPolicy {
    /// The intent this policy prefers for a query of the given length.
    fn preferred(&self, word_count: usize) -> Intent {
        match self {
            TieBreakPolicy::QueryLength { short_word_limit } => {
                if word_count < *short_word_limit {
                    Intent::JobSearch
                } else {
                    Intent::PositionAnalysis
                }
            }
            TieBreakPolicy::Fixed { intent } => *intent,
        }
    }
}

/// Configuration for intent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Tokens that mark a query as definitely general (greetings,
    /// thanks, meta questions about the assistant)
    pub general_vocabulary: Vec<String>,

    /// Tokens that mark a query as career-domain (job titles, skills,
    /// process nouns, compensation terms, tech stack names)
    pub career_vocabulary: Vec<String>,

    /// Regex bank for the career sub-intents, keyed by intent and language
    pub patterns: Vec<PatternSpec>,

    /// Substring fallback bank, distinct from the regex bank
    pub signals: Vec<SignalSpec>,

    /// Phrases referring to a specific posting ("this position") that
    /// boost PositionAnalysis in the fallback stage
    pub position_reference_phrases: Vec<String>,

    /// First-person possessive phrases ("my ", "do i") that boost
    /// ProfileAnalysis in the fallback stage
    pub first_person_phrases: Vec<String>,

    /// Word-count boundaries for the domain stage
    pub settings: ClassifierSettings,

    /// Tie-break policy for equally-scored intents
    pub tie_break: TieBreakPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let settings = ClassifierSettings::default();
        Self {
            tie_break: TieBreakPolicy::QueryLength {
                short_word_limit: settings.tie_break_short_words,
            },
            general_vocabulary: default_general_vocabulary(),
            career_vocabulary: default_career_vocabulary(),
            patterns: default_patterns(),
            signals: default_signals(),
            position_reference_phrases: vec![
                "this position".to_string(),
                "the position".to_string(),
                "this job".to_string(),
                "the job".to_string(),
                "this role".to_string(),
                "the role".to_string(),
                "this posting".to_string(),
                "vị trí này".to_string(),
                "công việc này".to_string(),
            ],
            first_person_phrases: vec![
                "my ".to_string(),
                "i have".to_string(),
                "do i".to_string(),
                "của tôi".to_string(),
                "tôi có".to_string(),
            ],
            settings,
        }
    }
}

fn default_general_vocabulary() -> Vec<String> {
    [
        // Greetings and thanks
        "hello", "hi", "hey", "greetings", "howdy", "thanks", "thank", "bye", "goodbye",
        // Off-topic small talk
        "weather", "joke", "lunch", "movie", "song",
        // Meta questions about the assistant
        "help", "assist", "chatbot", "assistant", "bot",
        // Vietnamese greetings/thanks
        "chào", "cảm", "ơn", "tạm", "biệt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_career_vocabulary() -> Vec<String> {
    [
        // Process nouns
        "job", "jobs", "career", "careers", "position", "positions", "role", "roles",
        "opening", "openings", "vacancy", "vacancies", "internship", "apprenticeship",
        "recruiter", "recruitment", "hiring", "interview", "interviews", "apply",
        "application", "applications", "employer", "employers", "offer", "onboarding",
        "promotion", "resignation",
        // Profile nouns
        "resume", "cv", "profile", "portfolio", "skill", "skills", "experience",
        "qualification", "qualifications", "requirement", "requirements",
        "responsibility", "responsibilities", "certification", "certifications",
        "degree", "education", "seniority", "junior", "senior", "lead",
        // Compensation terms
        "salary", "compensation", "pay", "paycheck", "benefits", "bonus", "equity",
        "negotiation",
        // Job titles
        "developer", "engineer", "programmer", "designer", "analyst", "manager",
        "architect", "scientist", "administrator", "consultant", "tester", "devops",
        // Tech stack names
        "python", "java", "javascript", "typescript", "rust", "golang", "kotlin",
        "swift", "sql", "nosql", "react", "angular", "vue", "nodejs", "django",
        "spring", "docker", "kubernetes", "aws", "azure", "gcp", "cloud", "linux",
        "backend", "frontend", "fullstack", "mobile", "database", "microservices",
        "agile", "scrum",
        // Vietnamese career terms
        "việc", "nghề", "nghiệp", "lương", "thưởng", "tuyển", "dụng", "phỏng",
        "vấn", "hồ", "sơ", "ứng", "viên", "kỹ", "năng", "kinh", "nghiệm",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_patterns() -> Vec<PatternSpec> {
    let table: [(Intent, Language, &str); 28] = [
        // JobSearch - find/compare/recommend positions
        (Intent::JobSearch, Language::En,
         r"\b(find|search|show|list|recommend|suggest)\b.*\b(jobs?|positions?|roles?|openings?)\b"),
        (Intent::JobSearch, Language::En,
         r"\bsuitable (jobs?|positions?|roles?)\b"),
        (Intent::JobSearch, Language::En,
         r"\bwhat (jobs?|positions?|roles?)\b.*\b(suit|fit|match|right)\b"),
        (Intent::JobSearch, Language::En,
         r"\b(which|what) (jobs?|positions?|roles?)\b.*\b(should|can|could) i apply\b"),
        (Intent::JobSearch, Language::En,
         r"\bjob (recommendations?|suggestions?)\b"),
        (Intent::JobSearch, Language::En,
         r"\bpositions? (for|matching) my (cv|profile|skills?|experience)\b"),
        // Skill-gap-for-employability questions count as job search
        (Intent::JobSearch, Language::En,
         r"\b(skill|knowledge) gaps?\b"),
        (Intent::JobSearch, Language::En,
         r"\bwhat\b.*\bmissing\b.*\b(in|from) my (cv|profile|skills?)\b"),
        (Intent::JobSearch, Language::En,
         r"\bwhat\b.*\b(need|should|must)\b.*\b(learn|improve|develop)\b"),
        (Intent::JobSearch, Language::Vi,
         r"tìm (việc|công việc|vị trí)"),
        (Intent::JobSearch, Language::Vi,
         r"(việc làm|công việc|vị trí) phù hợp"),
        (Intent::JobSearch, Language::Vi,
         r"gợi ý (việc|công việc|vị trí)"),
        (Intent::JobSearch, Language::Vi,
         r"(nên|có thể) ứng tuyển"),
        // PositionAnalysis - a specific posting's requirements/fit
        (Intent::PositionAnalysis, Language::En,
         r"\bsummari[sz]e\b.*\b(jd|job description|position)\b"),
        (Intent::PositionAnalysis, Language::En,
         r"\btell me (about|more about)\b.*\b(jd|job|position|role)\b"),
        (Intent::PositionAnalysis, Language::En,
         r"\bwhat (is|are)\b.*\b(requirements?|responsibilities|qualifications?)\b"),
        (Intent::PositionAnalysis, Language::En,
         r"\bkey (requirements?|skills?|qualifications?)\b"),
        (Intent::PositionAnalysis, Language::En,
         r"\bposition (description|requirements?|details?)\b"),
        (Intent::PositionAnalysis, Language::En,
         r"\b(what about|how about) (salary|benefits?|culture|team)\b"),
        (Intent::PositionAnalysis, Language::En,
         r"\b(am i|is \w+) qualified\b"),
        (Intent::PositionAnalysis, Language::En,
         r"\b(compare|match)\b.*\b(cv|resume|profile)\b.*\b(jd|job|position|role)\b"),
        (Intent::PositionAnalysis, Language::Vi,
         r"(yêu cầu|mô tả|quyền lợi) (của )?(công việc|vị trí)"),
        (Intent::PositionAnalysis, Language::Vi,
         r"phân tích (jd|vị trí|công việc)"),
        // ProfileAnalysis - self-assessment against the candidate's CV
        (Intent::ProfileAnalysis, Language::En,
         r"\bwhat\b.*\bskills? do i have\b"),
        (Intent::ProfileAnalysis, Language::En,
         r"\b(review|analyze|analyse|assess|evaluate|improve)\b.*\bmy (cv|resume|profile)\b"),
        (Intent::ProfileAnalysis, Language::En,
         r"\b(strengths?|weakness(es)?)\b.*\bmy (cv|resume|profile|background)\b"),
        (Intent::ProfileAnalysis, Language::En,
         r"\bsummari[sz]e my (cv|resume|profile|experience)\b"),
        (Intent::ProfileAnalysis, Language::Vi,
         r"(đánh giá|phân tích|cải thiện) (cv|hồ sơ)( của tôi)?"),
    ];

    table
        .iter()
        .map(|(intent, language, pattern)| PatternSpec {
            intent: *intent,
            language: *language,
            pattern: pattern.to_string(),
        })
        .collect()
}

fn default_signals() -> Vec<SignalSpec> {
    let table: [(Intent, Language, &str); 22] = [
        (Intent::JobSearch, Language::En, "find job"),
        (Intent::JobSearch, Language::En, "job for me"),
        (Intent::JobSearch, Language::En, "looking for"),
        (Intent::JobSearch, Language::En, "opportunit"),
        (Intent::JobSearch, Language::En, "opening"),
        (Intent::JobSearch, Language::En, "vacanc"),
        (Intent::JobSearch, Language::En, "hiring"),
        (Intent::JobSearch, Language::Vi, "tìm việc"),
        (Intent::JobSearch, Language::Vi, "cơ hội"),
        (Intent::PositionAnalysis, Language::En, "requirement"),
        (Intent::PositionAnalysis, Language::En, "responsibilit"),
        (Intent::PositionAnalysis, Language::En, "qualification"),
        (Intent::PositionAnalysis, Language::En, "salary"),
        (Intent::PositionAnalysis, Language::En, "benefit"),
        (Intent::PositionAnalysis, Language::En, "job description"),
        (Intent::PositionAnalysis, Language::Vi, "mô tả"),
        (Intent::PositionAnalysis, Language::Vi, "yêu cầu"),
        (Intent::ProfileAnalysis, Language::En, "my skill"),
        (Intent::ProfileAnalysis, Language::En, "my experience"),
        (Intent::ProfileAnalysis, Language::En, "my background"),
        (Intent::ProfileAnalysis, Language::Vi, "hồ sơ"),
        (Intent::ProfileAnalysis, Language::Vi, "kỹ năng của tôi"),
    ];

    table
        .iter()
        .map(|(intent, language, phrase)| SignalSpec {
            intent: *intent,
            language: *language,
            phrase: phrase.to_string(),
        })
        .collect()
}

/// Two-stage intent classifier.
///
/// Pure and allocation-only: safe to call from any number of concurrent
/// callers without synchronization.
pub struct IntentClassifier {
    config: ClassifierConfig,
    general_set: HashSet<String>,
    career_set: HashSet<String>,
    compiled_patterns: HashMap<Intent, Vec<Regex>>,
}

impl IntentClassifier {
    /// Create a classifier with the default banks.
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier with custom configuration.
    ///
    /// Patterns that fail to compile are skipped with a warning rather
    /// than failing construction; classification must stay total.
    pub fn with_config(config: ClassifierConfig) -> Self {
        let general_set = config
            .general_vocabulary
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        let career_set = config
            .career_vocabulary
            .iter()
            .map(|s| s.to_lowercase())
            .collect();

        let mut compiled_patterns: HashMap<Intent, Vec<Regex>> = HashMap::new();
        for spec in &config.patterns {
            match Regex::new(&spec.pattern) {
                Ok(regex) => compiled_patterns.entry(spec.intent).or_default().push(regex),
                Err(e) => warn!(
                    intent = spec.intent.as_str(),
                    language = spec.language.as_str(),
                    pattern = %spec.pattern,
                    error = %e,
                    "Skipping invalid intent pattern"
                ),
            }
        }

        Self {
            config,
            general_set,
            career_set,
            compiled_patterns,
        }
    }

    /// Classify a query into domain, intent, and confidence.
    pub fn classify(&self, query: &str) -> ClassificationResult {
        let query_lower = query.to_lowercase();
        let word_count = query_lower.split_whitespace().count();
        let tokens: HashSet<&str> = query_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let (domain, domain_confidence) = self.detect_domain(&tokens, word_count);

        if domain == Domain::General {
            debug!(
                query = query,
                domain_confidence = domain_confidence,
                "Classified as general domain"
            );
            return ClassificationResult {
                intent: Intent::General,
                domain,
                confidence: domain_confidence,
                domain_confidence,
                intent_scores: HashMap::new(),
            };
        }

        let preferred = self.config.tie_break.preferred(word_count);

        // Regex bank first; substring signals only when no pattern fires.
        let regex_scores = self.pattern_scores(&query_lower);
        let (intent, intent_confidence, intent_scores) =
            match pick_best(&regex_scores, preferred) {
                Some((intent, best)) => {
                    let confidence = self.pattern_confidence(intent, best);
                    (intent, confidence, regex_scores)
                }
                None => {
                    let signal_scores = self.signal_scores(&query_lower);
                    let intent = pick_best(&signal_scores, preferred)
                        .map(|(intent, _)| intent)
                        .unwrap_or(Intent::JobSearch);
                    (intent, 0.5, signal_scores)
                }
            };

        let confidence = domain_confidence * intent_confidence;

        debug!(
            query = query,
            intent = intent.as_str(),
            domain_confidence = domain_confidence,
            intent_confidence = intent_confidence,
            confidence = confidence,
            "Classified career query"
        );

        ClassificationResult {
            intent,
            domain,
            confidence,
            domain_confidence,
            intent_scores,
        }
    }

    /// Convenience wrapper returning just the intent.
    pub fn classify_simple(&self, query: &str) -> Intent {
        self.classify(query).intent
    }

    /// Stage 1: domain detection.
    fn detect_domain(&self, tokens: &HashSet<&str>, word_count: usize) -> (Domain, f32) {
        // Short + general-sounding overrides everything else.
        let has_general = tokens.iter().any(|t| self.general_set.contains(*t));
        if has_general && word_count <= self.config.settings.general_max_words {
            return (Domain::General, 0.9);
        }

        let career_matches = tokens
            .iter()
            .filter(|t| self.career_set.contains(**t))
            .count();
        if career_matches > 0 {
            // Any vocabulary hit is treated as fairly confident.
            let confidence = (career_matches as f32 / 3.0).min(1.0).max(0.7);
            return (Domain::Career, confidence);
        }

        // No vocabulary signal: longer queries are probably still
        // on-topic, just phrased unusually; short signal-free queries
        // skew toward chit-chat.
        if word_count > self.config.settings.career_default_min_words {
            (Domain::Career, 0.5)
        } else {
            (Domain::General, 0.6)
        }
    }

    /// Stage 2a: regex bank scores per intent.
    fn pattern_scores(&self, query_lower: &str) -> HashMap<Intent, usize> {
        Intent::CAREER_INTENTS
            .iter()
            .map(|intent| {
                let matches = self
                    .compiled_patterns
                    .get(intent)
                    .map(|patterns| patterns.iter().filter(|p| p.is_match(query_lower)).count())
                    .unwrap_or(0);
                (*intent, matches)
            })
            .collect()
    }

    /// Stage 2b: substring signal scores per intent, with the two
    /// contextual boosts applied.
    fn signal_scores(&self, query_lower: &str) -> HashMap<Intent, usize> {
        let mut scores: HashMap<Intent, usize> = Intent::CAREER_INTENTS
            .iter()
            .map(|intent| {
                let hits = self
                    .config
                    .signals
                    .iter()
                    .filter(|s| s.intent == *intent && query_lower.contains(&s.phrase))
                    .count();
                (*intent, hits)
            })
            .collect();

        // "this/the position" phrasing points strongly at a posting.
        if self
            .config
            .position_reference_phrases
            .iter()
            .any(|p| query_lower.contains(p))
        {
            *scores.entry(Intent::PositionAnalysis).or_default() += 2;
        }

        // First-person possessive phrasing points at self-assessment.
        if self
            .config
            .first_person_phrases
            .iter()
            .any(|p| query_lower.contains(p))
        {
            *scores.entry(Intent::ProfileAnalysis).or_default() += 1;
        }

        scores
    }

    /// Confidence for a regex-bank winner, normalized by bank size.
    fn pattern_confidence(&self, intent: Intent, best_score: usize) -> f32 {
        let total = self
            .config
            .patterns
            .iter()
            .filter(|p| p.intent == intent)
            .count();
        let mut confidence =
            (best_score as f32 / (total as f32 * 0.2).max(1.0)).min(1.0);
        if best_score >= 2 {
            confidence += 0.1;
        }
        confidence.max(0.6).min(1.0)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the highest-scoring intent, resolving ties via the preferred
/// intent when it is part of the tie, else by canonical intent order.
/// Returns `None` when every score is zero.
fn pick_best(scores: &HashMap<Intent, usize>, preferred: Intent) -> Option<(Intent, usize)> {
    let best = scores.values().copied().max().unwrap_or(0);
    if best == 0 {
        return None;
    }

    let tied: Vec<Intent> = Intent::CAREER_INTENTS
        .iter()
        .copied()
        .filter(|intent| scores.get(intent).copied().unwrap_or(0) == best)
        .collect();

    let winner = if tied.contains(&preferred) {
        preferred
    } else {
        tied[0]
    };
    Some((winner, best))
}
