use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Wire shapes for the backend's responses.
///
/// The service has grown organically and its payloads are loose: fields
/// come and go between versions, scores are sometimes wrapped in
/// one-element arrays, and two names exist for the same thing. Decoding
/// is therefore lenient (everything optional, aliases accepted) and the
/// result is validated once into strict types at this boundary. Only the
/// fields we use are parsed.

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordingsResponse {
    #[serde(default)]
    pub recordings: Vec<RecordingMeta>,
}

/// One entry in the user's recording library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingMeta {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fileId")]
    pub file_id: String,
    #[serde(rename = "fileName", default)]
    pub file_name: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(default)]
    pub transcript: Option<String>,
}

/// A score that may arrive bare or wrapped in a one-element array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScoreField {
    Number(f32),
    List(Vec<f32>),
}

impl Default for ScoreField {
    fn default() -> Self {
        ScoreField::Number(0.0)
    }
}

impl ScoreField {
    /// First element wins for the array form; absent/empty defaults to 0.
    pub fn value(&self) -> f32 {
        match self {
            ScoreField::Number(n) => *n,
            ScoreField::List(values) => values.first().copied().unwrap_or(0.0),
        }
    }
}

/// A hate-speech result line: either a bare sentence or an annotated one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HateSpeechEntry {
    Text(String),
    Detail {
        #[serde(default)]
        sentence: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        score: Option<f32>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct WireVolumeAnalysis {
    #[serde(default)]
    pub rms_values: Vec<f32>,
    #[serde(default)]
    pub volume_score: ScoreField,
}

/// The unified analysis payload from GET /recordings/{fileId}/transcript.
#[derive(Debug, Default, Deserialize)]
pub struct WireAnalysis {
    #[serde(default)]
    pub pitch_values: Vec<f32>,
    #[serde(default)]
    pub pitch_score: ScoreField,
    #[serde(default)]
    pub volume_analysis: Option<WireVolumeAnalysis>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default, alias = "word_rate")]
    pub speech_rate: Option<f32>,
    #[serde(default)]
    pub speed_score: Option<f32>,
    #[serde(default)]
    pub hate_speech_results: Vec<HateSpeechEntry>,
    #[serde(default)]
    pub hate_speech_ratio: Option<f32>,
    #[serde(default)]
    pub silence_durations: Vec<f32>,
    #[serde(default, alias = "keywords_nouns")]
    pub top_keywords: Vec<String>,
    #[serde(default)]
    pub regex_word_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub normal_word_counts: BTreeMap<String, u64>,
}

/// A validated hate-speech line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HateSpeechLine {
    pub sentence: String,
    pub label: Option<String>,
    pub score: Option<f32>,
}

/// The strict transcript-side view of the analysis payload, built once at
/// the decode boundary and cached as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    pub transcript: String,
    pub speech_rate: Option<f32>,
    pub speed_score: Option<f32>,
    pub hate_speech_ratio: Option<f32>,
    pub hate_speech: Vec<HateSpeechLine>,
    pub silence_durations: Vec<f32>,
    pub keywords: Vec<String>,
    pub regex_word_counts: BTreeMap<String, u64>,
    pub normal_word_counts: BTreeMap<String, u64>,
}

impl WireAnalysis {
    /// Pitch series and score. The score is clamped to the display scale.
    pub fn pitch(&self) -> (&[f32], f32) {
        (&self.pitch_values, self.pitch_score.value().clamp(0.0, 100.0))
    }

    /// Volume series and score, when the payload carries them.
    pub fn volume(&self) -> Option<(&[f32], f32)> {
        let analysis = self.volume_analysis.as_ref()?;
        Some((
            &analysis.rms_values,
            analysis.volume_score.value().clamp(0.0, 100.0),
        ))
    }

    /// Validate the NLP fields into the strict transcript view.
    pub fn into_transcript(self) -> TranscriptAnalysis {
        let hate_speech = self
            .hate_speech_results
            .into_iter()
            .map(|entry| match entry {
                HateSpeechEntry::Text(sentence) => HateSpeechLine {
                    sentence,
                    label: None,
                    score: None,
                },
                HateSpeechEntry::Detail {
                    sentence,
                    label,
                    score,
                } => HateSpeechLine {
                    sentence,
                    label,
                    score,
                },
            })
            .collect();

        TranscriptAnalysis {
            transcript: self.transcript.unwrap_or_default(),
            speech_rate: self.speech_rate,
            speed_score: self.speed_score,
            hate_speech_ratio: self.hate_speech_ratio,
            hate_speech,
            silence_durations: self.silence_durations,
            keywords: self.top_keywords,
            regex_word_counts: self.regex_word_counts,
            normal_word_counts: self.normal_word_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_field_accepts_bare_number() {
        let wire: WireAnalysis =
            serde_json::from_str(r#"{"pitch_values": [100.0], "pitch_score": 82.5}"#).unwrap();
        assert_eq!(wire.pitch().1, 82.5);
    }

    #[test]
    fn score_field_accepts_array() {
        let wire: WireAnalysis =
            serde_json::from_str(r#"{"pitch_values": [100.0], "pitch_score": [82.5, 1.0]}"#)
                .unwrap();
        assert_eq!(wire.pitch().1, 82.5);
    }

    #[test]
    fn missing_score_defaults_to_zero() {
        let wire: WireAnalysis = serde_json::from_str(r#"{"pitch_values": [100.0]}"#).unwrap();
        assert_eq!(wire.pitch().1, 0.0);
    }

    #[test]
    fn out_of_range_score_is_clamped() {
        let wire: WireAnalysis = serde_json::from_str(r#"{"pitch_score": 250.0}"#).unwrap();
        assert_eq!(wire.pitch().1, 100.0);
    }

    #[test]
    fn volume_absent_when_not_analyzed() {
        let wire: WireAnalysis = serde_json::from_str("{}").unwrap();
        assert!(wire.volume().is_none());
    }

    #[test]
    fn volume_present() {
        let wire: WireAnalysis = serde_json::from_str(
            r#"{"volume_analysis": {"rms_values": [55.0, 62.0], "volume_score": 71.0}}"#,
        )
        .unwrap();
        let (values, score) = wire.volume().unwrap();
        assert_eq!(values, &[55.0, 62.0]);
        assert_eq!(score, 71.0);
    }

    #[test]
    fn word_rate_aliases_speech_rate() {
        let wire: WireAnalysis = serde_json::from_str(r#"{"word_rate": 2.4}"#).unwrap();
        assert_eq!(wire.speech_rate, Some(2.4));
    }

    #[test]
    fn keywords_nouns_aliases_top_keywords() {
        let wire: WireAnalysis =
            serde_json::from_str(r#"{"keywords_nouns": ["voice", "energy"]}"#).unwrap();
        assert_eq!(wire.top_keywords, vec!["voice", "energy"]);
    }

    #[test]
    fn hate_speech_accepts_both_shapes() {
        let wire: WireAnalysis = serde_json::from_str(
            r#"{"hate_speech_results": [
                "plain sentence",
                {"sentence": "flagged one", "label": "hate", "score": 0.93}
            ]}"#,
        )
        .unwrap();
        let transcript = wire.into_transcript();
        assert_eq!(transcript.hate_speech.len(), 2);
        assert_eq!(transcript.hate_speech[0].sentence, "plain sentence");
        assert!(transcript.hate_speech[0].label.is_none());
        assert_eq!(transcript.hate_speech[1].label.as_deref(), Some("hate"));
    }

    #[test]
    fn empty_payload_validates_to_defaults() {
        let wire: WireAnalysis = serde_json::from_str("{}").unwrap();
        let transcript = wire.into_transcript();
        assert!(transcript.transcript.is_empty());
        assert!(transcript.speech_rate.is_none());
        assert!(transcript.keywords.is_empty());
    }

    #[test]
    fn recording_meta_field_names() {
        let json = r#"{
            "recordings": [{
                "_id": "64a1",
                "fileId": "f-001",
                "fileName": "Morning take",
                "createdAt": "2026-08-01T09:30:00+00:00",
                "transcript": "hello"
            }]
        }"#;
        let resp: RecordingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.recordings.len(), 1);
        let meta = &resp.recordings[0];
        assert_eq!(meta.id, "64a1");
        assert_eq!(meta.file_id, "f-001");
        assert_eq!(meta.transcript.as_deref(), Some("hello"));
    }

    #[test]
    fn transcript_analysis_roundtrip() {
        let wire: WireAnalysis = serde_json::from_str(
            r#"{"transcript": "hi", "speech_rate": 2.1, "silence_durations": [0.5, 1.2]}"#,
        )
        .unwrap();
        let transcript = wire.into_transcript();
        let json = serde_json::to_string(&transcript).unwrap();
        let loaded: TranscriptAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.transcript, "hi");
        assert_eq!(loaded.silence_durations, vec![0.5, 1.2]);
    }
}
