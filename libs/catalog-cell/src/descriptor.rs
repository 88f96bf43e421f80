use shared_database::store::collections;

/// A foreign-key style reference carried by an entity. Validated on
/// create and update whenever the field is present in the payload.
#[derive(Debug, Clone)]
pub struct Reference {
    pub field: &'static str,
    pub collection: &'static str,
    pub label: &'static str,
}

/// Blocks deletion while documents in `collection` still point at the
/// entity through `field`.
#[derive(Debug, Clone)]
pub struct DeleteGuard {
    pub collection: &'static str,
    pub field: &'static str,
    pub message: &'static str,
}

/// Everything the generic CRUD pipeline needs to know about one catalog
/// entity. Uniqueness is not listed here: unique keys are registered on
/// the store and surface as conflicts at write time.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub label: &'static str,
    pub label_plural: &'static str,
    pub collection: &'static str,
    pub required_fields: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub references: &'static [Reference],
    pub delete_guard: Option<DeleteGuard>,
    /// Entities with a public on/off switch accept the `isActive` list filter.
    pub has_active_flag: bool,
}

pub const DOCTORS: EntityDescriptor = EntityDescriptor {
    label: "Doctor",
    label_plural: "Doctors",
    collection: collections::DOCTORS,
    required_fields: &["name", "qualification"],
    search_fields: &["name", "qualification", "location"],
    references: &[Reference {
        field: "category",
        collection: collections::DOCTOR_CATEGORIES,
        label: "Doctor category",
    }],
    delete_guard: None,
    has_active_flag: true,
};

pub const DOCTOR_CATEGORIES: EntityDescriptor = EntityDescriptor {
    label: "Doctor category",
    label_plural: "Doctor categories",
    collection: collections::DOCTOR_CATEGORIES,
    required_fields: &["name"],
    search_fields: &["name"],
    references: &[],
    delete_guard: None,
    has_active_flag: false,
};

pub const HEALTHCARE_CENTERS: EntityDescriptor = EntityDescriptor {
    label: "Healthcare center",
    label_plural: "Healthcare centers",
    collection: collections::HEALTHCARE_CENTERS,
    required_fields: &["name", "address"],
    search_fields: &["name", "address"],
    references: &[Reference {
        field: "category",
        collection: collections::HEALTH_CATEGORIES,
        label: "Health category",
    }],
    delete_guard: None,
    has_active_flag: true,
};

pub const HEALTH_CATEGORIES: EntityDescriptor = EntityDescriptor {
    label: "Health category",
    label_plural: "Health categories",
    collection: collections::HEALTH_CATEGORIES,
    required_fields: &["name"],
    search_fields: &["name"],
    references: &[],
    delete_guard: Some(DeleteGuard {
        collection: collections::HEALTHCARE_CENTERS,
        field: "category",
        message: "Cannot delete category. Healthcare centers are using this category.",
    }),
    has_active_flag: false,
};

pub const JOBS: EntityDescriptor = EntityDescriptor {
    label: "Job",
    label_plural: "Jobs",
    collection: collections::JOBS,
    required_fields: &["title"],
    search_fields: &["title", "description", "location"],
    references: &[Reference {
        field: "category",
        collection: collections::JOB_CATEGORIES,
        label: "Job category",
    }],
    delete_guard: None,
    has_active_flag: true,
};

pub const JOB_CATEGORIES: EntityDescriptor = EntityDescriptor {
    label: "Job category",
    label_plural: "Job categories",
    collection: collections::JOB_CATEGORIES,
    required_fields: &["name"],
    search_fields: &["name"],
    references: &[],
    delete_guard: None,
    has_active_flag: false,
};

pub const JOB_APPLICATIONS: EntityDescriptor = EntityDescriptor {
    label: "Job application",
    label_plural: "Job applications",
    collection: collections::JOB_APPLICATIONS,
    required_fields: &["name", "email", "job"],
    search_fields: &["name", "email"],
    references: &[Reference {
        field: "job",
        collection: collections::JOBS,
        label: "Job",
    }],
    delete_guard: None,
    has_active_flag: false,
};

pub const COURSES: EntityDescriptor = EntityDescriptor {
    label: "Course",
    label_plural: "Courses",
    collection: collections::COURSES,
    required_fields: &["title"],
    search_fields: &["title", "description"],
    references: &[Reference {
        field: "category",
        collection: collections::COURSE_CATEGORIES,
        label: "Course category",
    }],
    delete_guard: None,
    has_active_flag: true,
};

pub const COURSE_CATEGORIES: EntityDescriptor = EntityDescriptor {
    label: "Course category",
    label_plural: "Course categories",
    collection: collections::COURSE_CATEGORIES,
    required_fields: &["name"],
    search_fields: &["name"],
    references: &[],
    delete_guard: None,
    has_active_flag: false,
};

pub const COURSE_REGISTRATIONS: EntityDescriptor = EntityDescriptor {
    label: "Course registration",
    label_plural: "Course registrations",
    collection: collections::COURSE_REGISTRATIONS,
    required_fields: &["name", "email", "course"],
    search_fields: &["name", "email"],
    references: &[Reference {
        field: "course",
        collection: collections::COURSES,
        label: "Course",
    }],
    delete_guard: None,
    has_active_flag: false,
};

pub const BLOGS: EntityDescriptor = EntityDescriptor {
    label: "Blog",
    label_plural: "Blogs",
    collection: collections::BLOGS,
    required_fields: &["title", "content"],
    search_fields: &["title", "content"],
    references: &[],
    delete_guard: None,
    has_active_flag: false,
};

/// Mount prefix and descriptor for every catalog entity the API serves.
pub const ALL: &[(&str, &EntityDescriptor)] = &[
    ("/doctors", &DOCTORS),
    ("/doctor-categories", &DOCTOR_CATEGORIES),
    ("/healthcare-centers", &HEALTHCARE_CENTERS),
    ("/health-categories", &HEALTH_CATEGORIES),
    ("/jobs", &JOBS),
    ("/job-categories", &JOB_CATEGORIES),
    ("/job-applications", &JOB_APPLICATIONS),
    ("/courses", &COURSES),
    ("/course-categories", &COURSE_CATEGORIES),
    ("/course-registrations", &COURSE_REGISTRATIONS),
    ("/blogs", &BLOGS),
];
