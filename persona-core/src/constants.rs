use crate::event::{PersonaDraft, Repeat};

/// A built-in persona offered to new users.
pub struct DefaultPersona {
    pub key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

pub const DEFAULT_PERSONAS: [DefaultPersona; 5] = [
    DefaultPersona {
        key: "journalist",
        name: "기자",
        color: "#3B82F6",
        description: "뉴스 취재 및 기사 작성 관련 업무",
    },
    DefaultPersona {
        key: "mother",
        name: "엄마",
        color: "#EC4899",
        description: "가족 돌봄 및 육아 관련 일정",
    },
    DefaultPersona {
        key: "researcher",
        name: "연구자",
        color: "#10B981",
        description: "학술 연구 및 논문 작성 업무",
    },
    DefaultPersona {
        key: "developer",
        name: "개발자",
        color: "#8B5CF6",
        description: "프로그래밍 및 개발 프로젝트",
    },
    DefaultPersona {
        key: "investor",
        name: "투자자",
        color: "#F59E0B",
        description: "투자 분석 및 포트폴리오 관리",
    },
];

pub fn default_persona_drafts() -> Vec<PersonaDraft> {
    DEFAULT_PERSONAS
        .iter()
        .map(|p| PersonaDraft {
            name: p.name.to_string(),
            color: p.color.to_string(),
            description: Some(p.description.to_string()),
        })
        .collect()
}

/// Lead times offered by the event form, in minutes.
pub const NOTIFICATION_OPTIONS: [(i64, &str); 4] = [
    (10, "10분 전"),
    (30, "30분 전"),
    (60, "1시간 전"),
    (1440, "1일 전"),
];

pub fn repeat_options() -> impl Iterator<Item = (Repeat, &'static str)> {
    Repeat::ALL.into_iter().map(|r| (r, r.label()))
}

/// How far ahead the "upcoming" list looks.
pub const UPCOMING_DAYS: i64 = 7;

/// How many events the "upcoming" list shows.
pub const UPCOMING_LIMIT: usize = 5;
