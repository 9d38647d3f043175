//! Effect lists.
//!
//! Effects are not framed by a container subrecord. An EFID opens an entry
//! and must be followed directly by the EFIT holding its magnitude, area and
//! duration. Each CTDA adds a condition and a CIS2 attaches a string
//! parameter to the latest condition.
//! The entry ends when the next EFID arrives or the record ends.

use std::io::Write;

use thuum_common::{BinaryReader, FormId, FourCC};

use crate::condition::{ConditionEntry, CONDITION_SIZE};
use crate::subrecord::{encoded_size, SubrecordStream, SubrecordWriter, MAX_TEXT_LENGTH};
use crate::tag::Tag;
use crate::{Error, Result};

/// Size of an EFIT payload.
pub const EFFECT_ITEM_SIZE: u16 = 12;

/// The tags making up one kind of effect group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRoles {
    /// Opens a new entry.
    pub start: Tag,
    /// Required once per entry.
    pub primary: Tag,
    /// Repeatable per entry.
    pub condition: Tag,
    /// At most once per condition, if the record type allows it at all.
    pub decoration: Option<Tag>,
}

/// What a tag does inside an effect group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    Start,
    Primary,
    Condition,
    Decoration,
}

impl GroupRoles {
    /// EFID / EFIT / CTDA.
    pub const EFFECTS: Self = Self {
        start: Tag::Efid,
        primary: Tag::Efit,
        condition: Tag::Ctda,
        decoration: None,
    };

    /// EFID / EFIT / CTDA / CIS2.
    pub const EFFECTS_WITH_STRINGS: Self = Self {
        decoration: Some(Tag::Cis2),
        ..Self::EFFECTS
    };

    /// Which role `code` plays, if any.
    pub fn role_of(&self, code: FourCC) -> Option<GroupRole> {
        if self.start == code {
            Some(GroupRole::Start)
        } else if self.primary == code {
            Some(GroupRole::Primary)
        } else if self.condition == code {
            Some(GroupRole::Condition)
        } else if self.decoration.is_some_and(|tag| tag == code) {
            Some(GroupRole::Decoration)
        } else {
            None
        }
    }
}

/// One effect with its conditions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EffectEntry {
    /// Base effect (MGEF) form ID.
    pub effect_form_id: FormId,
    pub magnitude: f32,
    pub area: u32,
    /// Duration in seconds.
    pub duration: u32,
    pub conditions: Vec<ConditionEntry>,
}

impl EffectEntry {
    pub fn new(effect_form_id: FormId, magnitude: f32, area: u32, duration: u32) -> Self {
        Self {
            effect_form_id,
            magnitude,
            area,
            duration,
            conditions: Vec::new(),
        }
    }

    /// Bytes written by [`save_to`](Self::save_to).
    pub fn write_size(&self) -> usize {
        encoded_size(4)
            + encoded_size(usize::from(EFFECT_ITEM_SIZE))
            + self
                .conditions
                .iter()
                .map(ConditionEntry::write_size)
                .sum::<usize>()
    }

    /// Write the entry using the tags in `roles`.
    pub fn save_to<W: Write + ?Sized>(&self, writer: &mut W, roles: &GroupRoles) -> Result<()> {
        writer.write_u32_subrecord(roles.start.code(), self.effect_form_id.value())?;

        let mut item = [0u8; EFFECT_ITEM_SIZE as usize];
        item[0..4].copy_from_slice(&self.magnitude.to_le_bytes());
        item[4..8].copy_from_slice(&self.area.to_le_bytes());
        item[8..12].copy_from_slice(&self.duration.to_le_bytes());
        writer.write_subrecord(roles.primary.code(), &item)?;

        for condition in &self.conditions {
            let text_tag = match roles.decoration {
                Some(tag) => tag.code(),
                None if condition.has_text() => {
                    return Err(Error::UnexpectedTag {
                        expected: None,
                        actual: Tag::Cis2.code(),
                    })
                }
                None => Tag::Cis2.code(),
            };
            condition.save_to(writer, roles.condition.code(), text_tag)?;
        }
        Ok(())
    }

    /// Check that the entry can be written with `roles`.
    pub fn fits(&self, roles: &GroupRoles) -> bool {
        self.conditions.iter().all(|c| match c.text() {
            None => true,
            Some(text) => {
                roles.decoration.is_some()
                    && text.len() < usize::from(MAX_TEXT_LENGTH)
                    && !text.contains_nul()
            }
        })
    }
}

/// Builds effect entries out of a flat subrecord stream.
#[derive(Debug)]
pub(crate) struct EffectGroupAssembler {
    record: FourCC,
    roles: GroupRoles,
    pending: Option<EffectEntry>,
    entries: Vec<EffectEntry>,
}

impl EffectGroupAssembler {
    pub(crate) fn new(record: FourCC, roles: GroupRoles) -> Self {
        Self {
            record,
            roles,
            pending: None,
            entries: Vec::new(),
        }
    }

    /// Feed one subrecord whose tag has already been read.
    pub(crate) fn accept(&mut self, role: GroupRole, stream: &mut SubrecordStream<'_>) -> Result<()> {
        match role {
            GroupRole::Start => self.start(stream),
            GroupRole::Primary => Err(self.stray_primary()),
            GroupRole::Condition => self.condition(stream),
            GroupRole::Decoration => self.decoration(stream),
        }
    }

    /// Close the last entry and hand back everything collected.
    pub(crate) fn finish(mut self) -> Vec<EffectEntry> {
        self.close_pending();
        self.entries
    }

    /// Read the start subrecord and the item that must follow it directly.
    fn start(&mut self, stream: &mut SubrecordStream<'_>) -> Result<()> {
        self.close_pending();
        let form_id = stream.read_u32(self.roles.start.code())?;

        let primary = self.roles.primary.code();
        stream.expect_tag(primary)?;
        let data = stream.read_exact(primary, EFFECT_ITEM_SIZE)?;
        let mut reader = BinaryReader::new(data);
        let magnitude = reader.read_f32()?;
        let area = reader.read_u32()?;
        let duration = reader.read_u32()?;

        self.pending = Some(EffectEntry::new(FormId::new(form_id), magnitude, area, duration));
        Ok(())
    }

    fn stray_primary(&self) -> Error {
        Error::GroupProtocolError {
            record: self.record,
            tag: self.roles.primary.code(),
            reason: if self.pending.is_some() {
                "appears twice in one effect"
            } else {
                "appears outside of an effect"
            },
        }
    }

    fn condition(&mut self, stream: &mut SubrecordStream<'_>) -> Result<()> {
        let tag = self.roles.condition;
        let pending = self.pending_mut(tag)?;

        let data = stream.read_exact(tag.code(), CONDITION_SIZE as u16)?;
        let mut condition = [0u8; CONDITION_SIZE];
        condition.copy_from_slice(data);
        pending.conditions.push(ConditionEntry::new(condition));
        Ok(())
    }

    fn decoration(&mut self, stream: &mut SubrecordStream<'_>) -> Result<()> {
        let record = self.record;
        let Some(tag) = self.roles.decoration else {
            return Err(Error::GroupProtocolError {
                record,
                tag: Tag::Cis2.code(),
                reason: "is not used by this record type",
            });
        };
        let pending = self.pending_mut(tag)?;

        let last = pending
            .conditions
            .last_mut()
            .ok_or(Error::GroupProtocolError {
                record,
                tag: tag.code(),
                reason: "has no preceding condition",
            })?;
        if last.has_text() {
            return Err(Error::GroupProtocolError {
                record,
                tag: tag.code(),
                reason: "appears twice for one condition",
            });
        }

        let text = stream.read_variable(tag.code(), MAX_TEXT_LENGTH)?;
        last.set_text(Some(text.into()));
        Ok(())
    }

    fn pending_mut(&mut self, tag: Tag) -> Result<&mut EffectEntry> {
        let record = self.record;
        self.pending.as_mut().ok_or(Error::GroupProtocolError {
            record,
            tag: tag.code(),
            reason: "appears outside of an effect",
        })
    }

    fn close_pending(&mut self) {
        if let Some(entry) = self.pending.take() {
            self.entries.push(entry);
        }
    }
}
