//! Reference entities, their inputs and their search criteria

mod class;
mod executor;
mod membership;
mod question;
mod tag;
mod user;

pub use class::{Class, ClassCriteria, ClassDraft, ClassUpdate, NewClass};
pub use executor::Executor;
pub use membership::{Membership, MembershipKey, NewMembership};
pub use question::{
    NewQuestion, Payload, Question, QuestionBody, QuestionCriteria, QuestionDraft,
};
pub use tag::{NewTag, Tag, TagCriteria, TAG_TEXT_MAX};
pub use user::{NewUser, Role, UnknownRole, User, UserCriteria, UserUpdate};

fn first_page() -> u32 {
    1
}
