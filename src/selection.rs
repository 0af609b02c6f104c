use crate::models::{CourseLevel, Instructor};

// ─── Stages ─────────────────────────────────────────────────────────────────

/// How deep the specialization → course → instructor → level drill-down has
/// been resolved. Ordered so stage requirements can be range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectionStage {
    Empty,
    SpecializationChosen,
    CourseChosen,
    InstructorChosen,
    LevelChosen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("Select a specialization first")]
    NeedSpecialization,
    #[error("Select a course first")]
    NeedCourse,
    #[error("Select an instructor first")]
    NeedInstructor,
}

// ─── Selection ──────────────────────────────────────────────────────────────

/// The four-level dependent selection. Choosing at any level clears every
/// level below it, and every transition bumps `generation`; async results
/// tagged with an older generation must be discarded on receipt.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    specialization_id: Option<u64>,
    course_id: Option<u64>,
    instructor_id: Option<u64>,
    level_id: Option<u64>,
    generation: u64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> SelectionStage {
        match (
            self.specialization_id,
            self.course_id,
            self.instructor_id,
            self.level_id,
        ) {
            (None, ..) => SelectionStage::Empty,
            (Some(_), None, ..) => SelectionStage::SpecializationChosen,
            (Some(_), Some(_), None, _) => SelectionStage::CourseChosen,
            (Some(_), Some(_), Some(_), None) => SelectionStage::InstructorChosen,
            (Some(_), Some(_), Some(_), Some(_)) => SelectionStage::LevelChosen,
        }
    }

    pub fn specialization_id(&self) -> Option<u64> {
        self.specialization_id
    }

    pub fn course_id(&self) -> Option<u64> {
        self.course_id
    }

    pub fn instructor_id(&self) -> Option<u64> {
        self.instructor_id
    }

    pub fn level_id(&self) -> Option<u64> {
        self.level_id
    }

    /// The tag carried by in-flight fetches issued under this selection.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when a fetch tagged `generation` still belongs to the current
    /// selection.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Choose a specialization; clears course/instructor/level.
    /// Returns the generation tag for the follow-up course fetch.
    pub fn choose_specialization(&mut self, id: u64) -> u64 {
        self.specialization_id = Some(id);
        self.course_id = None;
        self.instructor_id = None;
        self.level_id = None;
        self.bump()
    }

    /// Choose a course; requires a specialization, clears instructor/level.
    pub fn choose_course(&mut self, id: u64) -> Result<u64, SelectError> {
        if self.specialization_id.is_none() {
            return Err(SelectError::NeedSpecialization);
        }
        self.course_id = Some(id);
        self.instructor_id = None;
        self.level_id = None;
        Ok(self.bump())
    }

    /// Choose an instructor; requires a course, clears the level.
    pub fn choose_instructor(&mut self, id: u64) -> Result<u64, SelectError> {
        if self.course_id.is_none() {
            return Err(SelectError::NeedCourse);
        }
        self.instructor_id = Some(id);
        self.level_id = None;
        Ok(self.bump())
    }

    /// Choose a level; requires an instructor. The returned tag covers the
    /// content load this triggers.
    pub fn choose_level(&mut self, id: u64) -> Result<u64, SelectError> {
        if self.instructor_id.is_none() {
            return Err(SelectError::NeedInstructor);
        }
        self.level_id = Some(id);
        Ok(self.bump())
    }

    /// Back to Empty; everything cleared.
    pub fn reset_all(&mut self) -> u64 {
        *self = Self {
            generation: self.generation,
            ..Self::default()
        };
        self.bump()
    }
}

// ─── Level scoping ──────────────────────────────────────────────────────────

/// The level options offered once an instructor is chosen: the course's
/// levels restricted to the instructor's `level_ids`, in display order.
pub fn levels_for_instructor(
    course_levels: &[CourseLevel],
    instructor: &Instructor,
) -> Vec<CourseLevel> {
    let mut levels: Vec<CourseLevel> = course_levels
        .iter()
        .filter(|l| instructor.level_ids.contains(&l.id))
        .cloned()
        .collect();
    levels.sort_by_key(|l| l.order.unwrap_or(i64::MAX));
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(id: u64, order: i64) -> CourseLevel {
        CourseLevel {
            id,
            name: Some(format!("Level {id}")),
            order: Some(order),
            price_usd: None,
            price_sar: None,
            is_free: false,
            preview_url: None,
            download_url: None,
            instructor_id: None,
            image_url: None,
            is_active: true,
        }
    }

    #[test]
    fn drill_down_advances_stage() {
        let mut sel = Selection::new();
        assert_eq!(sel.stage(), SelectionStage::Empty);

        sel.choose_specialization(1);
        assert_eq!(sel.stage(), SelectionStage::SpecializationChosen);

        sel.choose_course(10).unwrap();
        assert_eq!(sel.stage(), SelectionStage::CourseChosen);

        sel.choose_instructor(100).unwrap();
        assert_eq!(sel.stage(), SelectionStage::InstructorChosen);

        sel.choose_level(1000).unwrap();
        assert_eq!(sel.stage(), SelectionStage::LevelChosen);
    }

    #[test]
    fn choosing_higher_level_clears_everything_below() {
        let mut sel = Selection::new();
        sel.choose_specialization(1);
        sel.choose_course(10).unwrap();
        sel.choose_instructor(100).unwrap();
        sel.choose_level(1000).unwrap();

        sel.choose_specialization(2);
        assert_eq!(sel.specialization_id(), Some(2));
        assert_eq!(sel.course_id(), None);
        assert_eq!(sel.instructor_id(), None);
        assert_eq!(sel.level_id(), None);
        assert_eq!(sel.stage(), SelectionStage::SpecializationChosen);
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let mut sel = Selection::new();
        assert_eq!(sel.choose_course(10), Err(SelectError::NeedSpecialization));
        assert_eq!(sel.choose_instructor(1), Err(SelectError::NeedCourse));
        assert_eq!(sel.choose_level(1), Err(SelectError::NeedInstructor));
        assert_eq!(sel.stage(), SelectionStage::Empty);
    }

    #[test]
    fn reset_clears_and_invalidates() {
        let mut sel = Selection::new();
        let gen_before = sel.choose_specialization(1);
        let gen_after = sel.reset_all();
        assert_eq!(sel.stage(), SelectionStage::Empty);
        assert!(gen_after > gen_before);
        assert!(!sel.is_current(gen_before));
    }

    #[test]
    fn stale_generations_are_not_current() {
        let mut sel = Selection::new();
        let course_fetch = sel.choose_specialization(1);
        assert!(sel.is_current(course_fetch));

        // A second flip before the first fetch lands supersedes it.
        let newer = sel.choose_specialization(2);
        assert!(!sel.is_current(course_fetch));
        assert!(sel.is_current(newer));
    }

    #[test]
    fn levels_are_scoped_to_the_instructor_and_ordered() {
        let course_levels = vec![level(3, 2), level(1, 1), level(2, 3)];
        let instructor = Instructor {
            id: 9,
            name: Some("I1".into()),
            level_ids: vec![2, 1],
        };
        let scoped = levels_for_instructor(&course_levels, &instructor);
        let ids: Vec<u64> = scoped.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
