//! Demo analyzer: canned transcript, summary, emotion, and quick replies.
//!
//! Stands in for speech-to-text and summarization. The payload is chosen by
//! looking for worry-related keywords in the uploaded file's original name,
//! which lets a demo operator steer the outcome by naming the recording.

use checkin_storage::Analysis;

/// Case-insensitive substrings that select the worried payload.
const WORRY_KEYWORDS: &[&str] = &[
    "worry", "sick", "doctor", "hospital", "pain", "擔心", "醫生", "生病",
];

/// Which canned payload an analysis produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoVariant {
    /// Doctor visit, high blood pressure, poor sleep.
    Worried,
    /// Walk in the park, ran into a friend.
    Content,
}

/// Output of the demo analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAnalysis {
    pub variant: DemoVariant,
    pub transcript: &'static str,
    pub summary3: [&'static str; 3],
    pub emotion: &'static str,
    pub quick_replies: [&'static str; 3],
}

impl DemoAnalysis {
    pub fn to_analysis(&self) -> Analysis {
        Analysis {
            summary3: self.summary3.iter().map(|s| s.to_string()).collect(),
            emotion: Some(self.emotion.to_string()),
            quick_replies: self.quick_replies.iter().map(|s| s.to_string()).collect(),
        }
    }
}

const WORRIED: DemoAnalysis = DemoAnalysis {
    variant: DemoVariant::Worried,
    transcript: "今天早上去診所看醫生，做了一些檢查。醫生說我的血壓有點高，要我少吃鹹的，\
                 下個月再回去複診。我有點擔心，晚上也睡得不太好，一直醒來。",
    summary3: ["今天去看醫生檢查", "血壓偏高有點擔心", "晚上睡得不太好"],
    emotion: "擔心",
    quick_replies: [
        "別擔心，我週末陪你去複診",
        "記得按時吃藥，早點休息喔",
        "我晚點打電話給你",
    ],
};

const CONTENT: DemoAnalysis = DemoAnalysis {
    variant: DemoVariant::Content,
    transcript: "今天天氣很好，下午去公園散步，剛好遇到以前的老朋友，\
                 我們坐在樹下聊了很久，心情很好，晚餐也多吃了一碗飯。",
    summary3: ["下午去公園散步", "遇到老朋友聊天", "心情很好胃口不錯"],
    emotion: "開心",
    quick_replies: [
        "聽起來好開心！",
        "下次也帶我去那個公園",
        "幫我跟你的朋友問好",
    ],
};

/// True when `original_name` mentions any worry keyword.
pub fn mentions_worry(original_name: &str) -> bool {
    let lowered = original_name.to_lowercase();
    WORRY_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Pick the canned analysis for a recording with this original filename.
pub fn analyze(original_name: &str) -> DemoAnalysis {
    if mentions_worry(original_name) {
        WORRIED
    } else {
        CONTENT
    }
}
