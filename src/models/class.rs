//! Classes and the slot rules used when inserting or moving them.
//!
//! A slot is `(schedule_id, weekday, number)`. Two classes in the same slot
//! collide when either runs every week or both run on the same week parity.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Id;
use crate::error::{AppError, AppResult};

/// Which weeks a class runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    Always,
    Even,
    Odd,
}

impl Parity {
    pub fn overlaps(self, other: Parity) -> bool {
        self == Parity::Always || other == Parity::Always || self == other
    }

    pub fn opposite(self) -> Option<Parity> {
        match self {
            Parity::Always => None,
            Parity::Even => Some(Parity::Odd),
            Parity::Odd => Some(Parity::Even),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Parity::Always => "always",
            Parity::Even => "even",
            Parity::Odd => "odd",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "always" => Some(Parity::Always),
            "even" => Some(Parity::Even),
            "odd" => Some(Parity::Odd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    pub id: Id,
    pub schedule_id: Id,
    pub title: String,
    pub teacher: Option<String>,
    pub room: Option<String>,
    /// ISO weekday, Monday = 1.
    pub weekday: i16,
    /// Period number within the day.
    pub number: i16,
    pub parity: Parity,
}

impl Class {
    pub fn same_slot(&self, weekday: i16, number: i16) -> bool {
        self.weekday == weekday && self.number == number
    }

    /// Copy of this class with the update applied.
    pub fn with_update(&self, update: &UpdateClassDto) -> Class {
        Class {
            id: self.id,
            schedule_id: self.schedule_id,
            title: update.title.clone().unwrap_or_else(|| self.title.clone()),
            teacher: update.teacher.clone().or_else(|| self.teacher.clone()),
            room: update.room.clone().or_else(|| self.room.clone()),
            weekday: update.weekday.unwrap_or(self.weekday),
            number: update.number.unwrap_or(self.number),
            parity: update.parity.unwrap_or(self.parity),
        }
    }
}

/// Listing row; classes are returned ordered by weekday, number, parity.
pub type ClassView = Class;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClassDto {
    pub schedule_id: Id,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub teacher: Option<String>,
    #[validate(length(max = 64))]
    pub room: Option<String>,
    #[validate(range(min = 1, max = 7))]
    pub weekday: i16,
    #[validate(range(min = 1, max = 12))]
    pub number: i16,
    #[serde(default = "default_parity")]
    pub parity: Parity,
}

fn default_parity() -> Parity {
    Parity::Always
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub teacher: Option<String>,
    #[validate(length(max = 64))]
    pub room: Option<String>,
    #[validate(range(min = 1, max = 7))]
    pub weekday: Option<i16>,
    #[validate(range(min = 1, max = 12))]
    pub number: Option<i16>,
    pub parity: Option<Parity>,
}

/// What `create_or_split` has to write.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPlan {
    Insert,
    /// Narrow the every-week class `class_id` to `parity`, then insert.
    Split { class_id: Id, parity: Parity },
}

/// Decide how to insert `new` given the classes already in its slot.
pub fn plan_insert(slot: &[Class], new: &CreateClassDto) -> AppResult<InsertPlan> {
    let colliding: Vec<&Class> = slot
        .iter()
        .filter(|c| c.same_slot(new.weekday, new.number) && c.parity.overlaps(new.parity))
        .collect();

    match (colliding.as_slice(), new.parity.opposite()) {
        ([], _) => Ok(InsertPlan::Insert),
        ([existing], Some(rest)) if existing.parity == Parity::Always => Ok(InsertPlan::Split {
            class_id: existing.id,
            parity: rest,
        }),
        _ => Err(AppError::AlreadyExists),
    }
}

/// What `update_or_switch` has to write.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePlan {
    Update(Class),
    /// `displaced` takes over the slot and parity `updated` had before.
    Switch { updated: Class, displaced: Class },
}

/// Decide how to apply `update` to `current`. `schedule` holds the other
/// classes of the same schedule (it may include `current` itself).
pub fn plan_update(
    current: &Class,
    update: &UpdateClassDto,
    schedule: &[Class],
) -> AppResult<UpdatePlan> {
    let updated = current.with_update(update);
    let colliding: Vec<&Class> = schedule
        .iter()
        .filter(|c| {
            c.id != current.id
                && c.same_slot(updated.weekday, updated.number)
                && c.parity.overlaps(updated.parity)
        })
        .collect();

    match colliding.as_slice() {
        [] => Ok(UpdatePlan::Update(updated)),
        [other] => {
            let mut displaced = (*other).clone();
            displaced.weekday = current.weekday;
            displaced.number = current.number;
            displaced.parity = current.parity;
            if displaced.same_slot(updated.weekday, updated.number)
                && displaced.parity.overlaps(updated.parity)
            {
                return Err(AppError::AlreadyExists);
            }
            Ok(UpdatePlan::Switch { updated, displaced })
        }
        _ => Err(AppError::AlreadyExists),
    }
}
