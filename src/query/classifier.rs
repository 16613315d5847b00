//! Rule-based intent classification.
//!
//! Intents are tested in a fixed priority order, most specific first. The first
//! intent with any matching pattern wins and nothing after it is evaluated, so
//! overlapping patterns are resolved purely by position in `INTENT_PRIORITY`.
//! Moving an entry changes the answer for every question matching both.

use std::sync::OnceLock;

use regex::Regex;

use super::filters::extract_filters;
use super::intent::{IntentType, ParsedIntent};

/// Priority list. `General` is the fallback and has no patterns.
const INTENT_PRIORITY: &[(IntentType, &[&str])] = &[
    (
        IntentType::MeetingPrep,
        &[
            r"\bprep(are|aring)?\b",
            r"\bmeeting (with|about)\b",
            r"\bcall with\b",
            r"\bbrief(ing)?( me)? (on|for|about)\b",
            r"\bbefore (my|the|our) (meeting|call)\b",
            r"\btell me about\b",
            r"\bwhat do (i|we) know about\b",
        ],
    ),
    (
        IntentType::PipelineSilent,
        &[
            r"\bsilent\b",
            r"\bgone (quiet|cold|dark)\b",
            r"\bgoing (quiet|cold|dark)\b",
            r"\bstale\b",
            r"\bno (recent )?(contact|response|activity|reply)\b",
            r"\bnot (been )?(contacted|touched)\b",
            r"\bhaven'?t (heard|contacted|talked|spoken)\b",
            r"\bneglected\b",
            r"\bfollow[- ]?ups? (due|needed|overdue)\b",
        ],
    ),
    (
        IntentType::PipelineByValue,
        &[
            r"\b(over|above|more than|under|below|less than)\s*\$\s*\d",
            r"\b(deals?|opportunit(y|ies)|contracts?)\s+(over|above|more than|under|below|less than|worth)\s+\$?\s*\d",
            r"\b(big|bigger|biggest|large|larger|largest|top|high[- ]value|highest[- ]value)\s+(deals?|opportunit(y|ies)|contracts?)\b",
            r"\bmost valuable\b",
        ],
    ),
    (
        IntentType::RecruitmentByStage,
        &[
            r"\b(candidates?|applicants?|recruits?)\b.*\b(sourced|applied|screen(ing|ed)?|interview\w*|offers?|hired|rejected)\b",
            r"\b(sourced|applied|screen(ing|ed)?|interview\w*|offers?|hired|rejected)\b.*\b(candidates?|applicants?|recruits?)\b",
            r"\bwho('s| is) (interviewing|in interviews?)\b",
        ],
    ),
    (
        IntentType::Recruitment,
        &[
            r"\b(candidates?|applicants?|recruit\w*|hiring|hires?|talent)\b",
            r"\b(job )?openings?\b",
            r"\bopen (roles?|positions?)\b",
        ],
    ),
    (
        IntentType::CompetitorIntel,
        &[
            r"\bcompetit\w*",
            r"\brivals?\b",
            r"\bversus\b",
            r"\bvs\.?\s",
            r"\bmarket landscape\b",
            r"\balternatives? to\b",
        ],
    ),
    (
        IntentType::CustomerHealth,
        &[
            r"\bhealth(y)?\b",
            r"\bchurn\w*",
            r"\bat[- ]risk\b",
            r"\bretention\b",
            r"\bcustomer satisfaction\b",
            r"\bcheck[- ]?ins?\b",
        ],
    ),
    (
        IntentType::PipelineAnalytics,
        &[
            r"\banalytics?\b",
            r"\bconversion\b",
            r"\bwin rate\b",
            r"\bforecast\w*",
            r"\bmetrics\b",
            r"\bstats\b",
            r"\bstatistics\b",
            r"\btrends?\b",
            r"\baverage deal\b",
            r"\bbreakdown\b",
            r"\bperformance\b",
        ],
    ),
    (
        IntentType::Prospecting,
        &[
            r"\bprospect\w*",
            r"\bnew leads?\b",
            r"\blead gen\w*",
            r"\boutreach\b",
            r"\bfind (new |more )?(customers|clients|leads)\b",
            r"\bwho should (i|we) (contact|reach out to|call|email)\b",
        ],
    ),
    (
        IntentType::PipelineByStage,
        &[
            r"\b(in|at)\s+(the\s+)?(lead|in-contact|contact|proposal|negotiat\w*|closed[- ]won|closed[- ]lost|won|lost)\b",
            r"\b(lead|proposal|negotiat\w*|closed[- ]won|closed[- ]lost)\s+stage\b",
            r"\b(deals?|opportunit(y|ies))\b.*\b(negotiat\w*|proposals?|won|lost|closed)\b",
            r"\bstages?\b",
        ],
    ),
    (
        IntentType::PipelineOverview,
        &[
            r"\bpipeline\b",
            r"\bdeals?\b",
            r"\bopportunit(y|ies)\b",
            r"\bsales\b",
            r"\bcustomers?\b",
            r"\bclients?\b",
            r"\baccounts?\b",
            r"\brevenue\b",
            r"\bleads?\b",
        ],
    ),
];

/// Compiled form of `INTENT_PRIORITY`. Built once, never mutated.
fn intent_table() -> &'static [(IntentType, Vec<Regex>)] {
    static TABLE: OnceLock<Vec<(IntentType, Vec<Regex>)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        INTENT_PRIORITY
            .iter()
            .map(|(intent, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(p).unwrap())
                    .collect::<Vec<_>>();
                (*intent, compiled)
            })
            .collect()
    })
}

/// Classify a question. Total: anything unrecognized is `General`.
pub fn classify_query(query: &str) -> ParsedIntent {
    let filters = extract_filters(query);
    let lower = query.to_lowercase();

    let intent = intent_table()
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&lower)))
        .map(|(intent, _)| *intent)
        .unwrap_or(IntentType::General);

    log::debug!("Classified query as {}: {:?}", intent, filters);

    ParsedIntent {
        intent,
        filters,
        original_query: query.to_string(),
    }
}

/// Every intent whose patterns match, in priority order. The first element is
/// what `classify_query` returns; the rest are the overlaps it shadowed.
#[cfg(test)]
pub(crate) fn matching_intents(query: &str) -> Vec<IntentType> {
    let lower = query.to_lowercase();
    intent_table()
        .iter()
        .filter(|(_, patterns)| patterns.iter().any(|re| re.is_match(&lower)))
        .map(|(intent, _)| *intent)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filters::Stage;

    fn intent_of(query: &str) -> IntentType {
        classify_query(query).intent
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(intent_table().len(), INTENT_PRIORITY.len());
    }

    #[test]
    fn test_priority_list_is_unique_and_excludes_general() {
        let mut seen = std::collections::HashSet::new();
        for (intent, patterns) in INTENT_PRIORITY {
            assert!(seen.insert(*intent), "{} listed twice", intent);
            assert_ne!(*intent, IntentType::General);
            assert!(!patterns.is_empty());
        }
        assert_eq!(seen.len(), IntentType::ALL.len() - 1);
    }

    #[test]
    fn test_meeting_prep_beats_pipeline() {
        let query = "prep for my meeting with Jordan about the deal next week";
        let matches = matching_intents(query);
        assert!(matches.contains(&IntentType::PipelineOverview));
        assert_eq!(matches[0], IntentType::MeetingPrep);
        assert_eq!(intent_of(query), IntentType::MeetingPrep);
        assert_eq!(
            intent_of("prep for my meeting with Jordan next week"),
            IntentType::MeetingPrep
        );
    }

    #[test]
    fn test_silent_beats_overview() {
        let query = "Which deals have gone silent?";
        let matches = matching_intents(query);
        assert_eq!(matches.first(), Some(&IntentType::PipelineSilent));
        assert!(matches.contains(&IntentType::PipelineOverview));
        assert_eq!(intent_of(query), IntentType::PipelineSilent);
    }

    #[test]
    fn test_who_is_questions_reach_their_intent() {
        let parsed = classify_query("Who is interviewing?");
        assert_eq!(parsed.intent, IntentType::RecruitmentByStage);
        assert_eq!(parsed.filters.stage, Some(Stage::Interview));
        assert_eq!(intent_of("Who's interviewing?"), IntentType::RecruitmentByStage);
        assert_eq!(intent_of("Who is at risk?"), IntentType::CustomerHealth);
        assert_eq!(intent_of("Who is in negotiation?"), IntentType::PipelineByStage);
        assert!(!matching_intents("Who is at risk?").contains(&IntentType::MeetingPrep));
        assert_eq!(intent_of("Tell me about Acme"), IntentType::MeetingPrep);
    }

    #[test]
    fn test_silent_with_days() {
        let parsed = classify_query("Show deals silent for 21 days");
        assert_eq!(parsed.intent, IntentType::PipelineSilent);
        assert_eq!(parsed.filters.days, Some(21));
    }

    #[test]
    fn test_by_value() {
        let parsed = classify_query("Show me deals over $1000");
        assert_eq!(parsed.intent, IntentType::PipelineByValue);
        assert_eq!(parsed.filters.min_value, Some(1000.0));
        assert_eq!(intent_of("what are our biggest deals"), IntentType::PipelineByValue);
    }

    #[test]
    fn test_recruitment_by_stage() {
        let parsed = classify_query("show candidates in interview stage");
        assert_eq!(parsed.intent, IntentType::RecruitmentByStage);
        assert_eq!(parsed.filters.stage, Some(Stage::Interview));
    }

    #[test]
    fn test_recruitment() {
        assert_eq!(intent_of("how is hiring going"), IntentType::Recruitment);
        assert_eq!(intent_of("list all candidates"), IntentType::Recruitment);
    }

    #[test]
    fn test_pipeline_by_stage() {
        let parsed = classify_query("deals in negotiation");
        assert_eq!(parsed.intent, IntentType::PipelineByStage);
        assert_eq!(parsed.filters.stage, Some(Stage::Negotiating));
    }

    #[test]
    fn test_competitors() {
        assert_eq!(intent_of("What do competitors charge?"), IntentType::CompetitorIntel);
        assert_eq!(intent_of("us vs Initech"), IntentType::CompetitorIntel);
    }

    #[test]
    fn test_customer_health() {
        assert_eq!(intent_of("which customers are at risk"), IntentType::CustomerHealth);
        assert_eq!(intent_of("customer health check"), IntentType::CustomerHealth);
    }

    #[test]
    fn test_analytics() {
        assert_eq!(intent_of("what's our win rate"), IntentType::PipelineAnalytics);
        assert_eq!(intent_of("pipeline analytics"), IntentType::PipelineAnalytics);
    }

    #[test]
    fn test_prospecting() {
        assert_eq!(intent_of("find new leads"), IntentType::Prospecting);
        assert_eq!(intent_of("who should I reach out to"), IntentType::Prospecting);
    }

    #[test]
    fn test_overview() {
        assert_eq!(intent_of("show me the pipeline"), IntentType::PipelineOverview);
        assert_eq!(intent_of("How are sales looking?"), IntentType::PipelineOverview);
    }

    #[test]
    fn test_fallback_is_general() {
        assert_eq!(intent_of("banana"), IntentType::General);
        assert_eq!(intent_of(""), IntentType::General);
        assert_eq!(intent_of("   "), IntentType::General);
    }

    #[test]
    fn test_deterministic() {
        let queries = [
            "Which deals have gone silent?",
            "prep for my meeting with Jordan next week",
            "banana",
            "candidates in interview stage",
        ];
        for q in queries {
            assert_eq!(classify_query(q), classify_query(q));
        }
    }

    #[test]
    fn test_original_query_preserved() {
        let parsed = classify_query("Show Me The Pipeline");
        assert_eq!(parsed.original_query, "Show Me The Pipeline");
    }

    #[test]
    fn test_suggested_follow_ups_round_trip() {
        // Follow-ups offered by handlers must land on the intent they promise.
        assert_eq!(intent_of("Which deals have gone silent?"), IntentType::PipelineSilent);
        assert_eq!(intent_of("Show me deals over $5,000"), IntentType::PipelineByValue);
        assert_eq!(intent_of("Show pipeline analytics"), IntentType::PipelineAnalytics);
        assert_eq!(intent_of("Show candidates in interview stage"), IntentType::RecruitmentByStage);
        assert_eq!(intent_of("How healthy are our customers?"), IntentType::CustomerHealth);
    }
}
