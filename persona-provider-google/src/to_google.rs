use persona_core::sync::{ExternalEvent, ExternalTime};

pub trait ToGoogle {
    fn to_google(&self) -> google_calendar::types::Event;
}

impl ToGoogle for ExternalEvent {
    fn to_google(&self) -> google_calendar::types::Event {
        // id left empty so Google assigns one
        google_calendar::types::Event {
            summary: self.summary.clone(),
            description: self.description.clone(),
            start: Some(time_to_google(&self.start)),
            end: Some(time_to_google(&self.end)),
            recurrence: self.recurrence.clone(),
            ..Default::default()
        }
    }
}

fn time_to_google(time: &ExternalTime) -> google_calendar::types::EventDateTime {
    google_calendar::types::EventDateTime {
        date: None,
        date_time: Some(time.date_time),
        time_zone: time.time_zone.clone(),
    }
}
