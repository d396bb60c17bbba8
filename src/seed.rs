use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{
    Activity, AlertKind, Announcement, AnnouncementTarget, Assignment, AssignmentStatus, Course,
    FacultyTask, GradedCourse, LeaveKind, LeaveRequest, LeaveStatus, Notification, NotificationKind,
    PendingReview, Priority, ReevaluationRequest, ReevaluationStatus, SemesterRecord, StepKind,
    SystemAlert, SystemStats, Workflow, WorkflowStatus, WorkflowStep,
};

/// Dataset
///
/// Every collection the portal serves. Built fresh per process and mutated in
/// place; nothing is written back anywhere.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub courses: Vec<Course>,
    pub assignments: Vec<Assignment>,
    pub semesters: Vec<SemesterRecord>,
    pub notifications: Vec<Notification>,
    pub leave_requests: Vec<LeaveRequest>,
    pub reevaluations: Vec<ReevaluationRequest>,
    pub workflows: Vec<Workflow>,
    pub announcements: Vec<Announcement>,
    pub stats: SystemStats,
    pub activities: Vec<Activity>,
    pub alerts: Vec<SystemAlert>,
    pub pending_reviews: Vec<PendingReview>,
    pub faculty_tasks: Vec<FacultyTask>,
}

impl Dataset {
    pub fn seeded() -> Self {
        Self {
            courses: courses(),
            assignments: assignments(),
            semesters: semesters(),
            notifications: notifications(),
            leave_requests: leave_requests(),
            reevaluations: reevaluations(),
            workflows: workflows(),
            announcements: announcements(),
            stats: stats(),
            activities: activities(),
            alerts: alerts(),
            pending_reviews: pending_reviews(),
            faculty_tasks: faculty_tasks(),
        }
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(h, min, 0).unwrap_or_default()
}

fn course(id: &str, name: &str, credits: u8, instructor: &str, progress: u8, grade: &str, attendance: f64) -> Course {
    Course {
        id: id.to_string(),
        code: id.to_string(),
        name: name.to_string(),
        credits,
        semester: Some(6),
        instructor: Some(instructor.to_string()),
        progress: Some(progress),
        grade: Some(grade.to_string()),
        attendance: Some(attendance),
    }
}

fn courses() -> Vec<Course> {
    vec![
        course("CSE301", "Data Structures", 4, "Dr. Debrup Das", 75, "A", 90.0),
        course("CSE302", "Database Systems", 3, "Prof. Robert Brown", 60, "B+", 85.0),
        course("CSE303", "Computer Networks", 4, "Dr. Emily Davis", 80, "A-", 88.0),
        course("CSE304", "Operating Systems", 4, "Prof. James Wilson", 65, "B", 82.0),
    ]
}

fn assignments() -> Vec<Assignment> {
    vec![
        Assignment {
            id: "ASG001".to_string(),
            title: "Binary Search Tree Implementation".to_string(),
            course_id: "CSE301".to_string(),
            course_name: "Data Structures".to_string(),
            deadline: at(2026, 2, 15, 23, 59),
            status: AssignmentStatus::Pending,
            marks: None,
            total_marks: 100,
            description: Some(
                "Implement a binary search tree with insertion, deletion, and traversal operations."
                    .to_string(),
            ),
            submitted_at: None,
        },
        Assignment {
            id: "ASG002".to_string(),
            title: "SQL Queries Assignment".to_string(),
            course_id: "CSE302".to_string(),
            course_name: "Database Systems".to_string(),
            deadline: at(2026, 2, 10, 23, 59),
            status: AssignmentStatus::Submitted,
            marks: None,
            total_marks: 50,
            description: Some("Write SQL queries for the given database schema.".to_string()),
            submitted_at: Some(at(2026, 2, 9, 18, 30)),
        },
        Assignment {
            id: "ASG003".to_string(),
            title: "Network Protocol Analysis".to_string(),
            course_id: "CSE303".to_string(),
            course_name: "Computer Networks".to_string(),
            deadline: at(2026, 2, 20, 23, 59),
            status: AssignmentStatus::Graded,
            marks: Some(68),
            total_marks: 75,
            description: Some("Analyze TCP/IP protocols using Wireshark.".to_string()),
            submitted_at: None,
        },
    ]
}

fn graded(code: &str, name: &str, credits: u8, grade: &str) -> GradedCourse {
    GradedCourse {
        code: code.to_string(),
        name: name.to_string(),
        credits,
        grade: grade.to_string(),
    }
}

fn semesters() -> Vec<SemesterRecord> {
    vec![
        SemesterRecord {
            semester: 1,
            courses: vec![
                graded("CSE101", "Introduction to Programming", 4, "A"),
                graded("MAT101", "Engineering Mathematics I", 4, "A-"),
                graded("PHY101", "Engineering Physics", 3, "B+"),
                graded("ENG101", "Communication Skills", 2, "A"),
                graded("CSE102", "Digital Logic", 3, "B"),
            ],
        },
        SemesterRecord {
            semester: 2,
            courses: vec![
                graded("CSE201", "Data Structures", 4, "A"),
                graded("MAT201", "Engineering Mathematics II", 4, "B+"),
                graded("CSE202", "Object Oriented Programming", 3, "A-"),
                graded("ECE201", "Basic Electronics", 3, "B"),
                graded("CSE203", "Computer Organization", 3, "B+"),
            ],
        },
        SemesterRecord {
            semester: 3,
            courses: vec![
                graded("CSE301", "Algorithms", 4, "A-"),
                graded("CSE302", "Database Systems", 3, "B+"),
                graded("CSE303", "Operating Systems", 4, "B"),
                graded("MAT301", "Discrete Mathematics", 3, "A"),
                graded("CSE304", "Web Technologies", 3, "A-"),
            ],
        },
        SemesterRecord {
            semester: 4,
            courses: vec![
                graded("CSE401", "Computer Networks", 4, "A"),
                graded("CSE402", "Software Engineering", 3, "A-"),
                graded("CSE403", "Theory of Computation", 3, "B+"),
                graded("CSE404", "Machine Learning", 3, "A"),
                graded("CSE405", "Cloud Computing", 3, "B+"),
            ],
        },
        SemesterRecord {
            semester: 5,
            courses: vec![
                graded("CSE501", "Artificial Intelligence", 4, "A-"),
                graded("CSE502", "Cyber Security", 3, "B+"),
                graded("CSE503", "Data Mining", 3, "A"),
                graded("CSE504", "Mobile App Development", 3, "A-"),
                graded("CSE505", "Project Management", 2, "A"),
            ],
        },
        SemesterRecord {
            semester: 6,
            courses: vec![
                graded("CSE601", "Big Data Analytics", 4, "IP"),
                graded("CSE602", "Blockchain Technology", 3, "IP"),
                graded("CSE603", "IoT Systems", 3, "IP"),
                graded("CSE604", "Capstone Project", 4, "IP"),
                graded("CSE605", "Technical Elective", 3, "IP"),
            ],
        },
    ]
}

fn notification(id: &str, title: &str, message: &str, kind: NotificationKind, timestamp: NaiveDateTime, read: bool) -> Notification {
    Notification {
        id: id.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        kind,
        timestamp,
        read,
    }
}

fn notifications() -> Vec<Notification> {
    vec![
        notification(
            "NOT001",
            "Assignment Deadline Reminder",
            "Binary Search Tree assignment is due in 2 days.",
            NotificationKind::Warning,
            at(2026, 2, 13, 10, 0),
            false,
        ),
        notification(
            "NOT002",
            "Grade Published",
            "Your Network Protocol Analysis assignment has been graded.",
            NotificationKind::Success,
            at(2026, 2, 12, 14, 30),
            true,
        ),
        notification(
            "NOT003",
            "New Announcement",
            "Mid-semester exam schedule has been published.",
            NotificationKind::Info,
            at(2026, 2, 11, 9, 0),
            false,
        ),
        notification(
            "NOT004",
            "Leave Request Approved",
            "Your leave request for Feb 15-16 has been approved.",
            NotificationKind::Success,
            at(2026, 2, 10, 16, 45),
            true,
        ),
    ]
}

fn leave_requests() -> Vec<LeaveRequest> {
    vec![
        LeaveRequest {
            id: "LEV001".to_string(),
            kind: LeaveKind::Medical,
            from_date: day(2026, 2, 15),
            to_date: day(2026, 2, 16),
            reason: "Doctor appointment and recovery".to_string(),
            status: LeaveStatus::Approved,
            documents: vec!["medical_certificate.pdf".to_string()],
        },
        LeaveRequest {
            id: "LEV002".to_string(),
            kind: LeaveKind::Personal,
            from_date: day(2026, 2, 20),
            to_date: day(2026, 2, 20),
            reason: "Family function".to_string(),
            status: LeaveStatus::Pending,
            documents: Vec::new(),
        },
    ]
}

fn reevaluations() -> Vec<ReevaluationRequest> {
    vec![ReevaluationRequest {
        id: "REV001".to_string(),
        course_id: "CSE302".to_string(),
        course_name: "Database Systems".to_string(),
        exam_type: "Mid Semester".to_string(),
        reason: "I believe my answers were correct and deserve more marks.".to_string(),
        status: ReevaluationStatus::UnderReview,
        original_grade: Some("B".to_string()),
        new_grade: None,
    }]
}

fn step(id: &str, name: &str, kind: StepKind, assignee: Option<&str>, sla: Option<u32>) -> WorkflowStep {
    WorkflowStep {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        assignee: assignee.map(str::to_string),
        sla,
    }
}

fn workflows() -> Vec<Workflow> {
    vec![
        Workflow {
            id: "WF001".to_string(),
            name: "Leave Approval Workflow".to_string(),
            description: "Standard workflow for student leave requests".to_string(),
            status: WorkflowStatus::Active,
            steps: vec![
                step("S1", "Student Submit", StepKind::Task, None, None),
                step("S2", "Faculty Review", StepKind::Approval, Some("Faculty"), Some(24)),
                step("S3", "Admin Approval", StepKind::Approval, Some("Admin"), Some(48)),
                step("S4", "Notification", StepKind::Notification, None, None),
            ],
        },
        Workflow {
            id: "WF002".to_string(),
            name: "Re-evaluation Workflow".to_string(),
            description: "Workflow for exam re-evaluation requests".to_string(),
            status: WorkflowStatus::Active,
            steps: vec![
                step("S1", "Student Apply", StepKind::Task, None, None),
                step("S2", "Fee Payment", StepKind::Task, None, None),
                step("S3", "Reviewer Assign", StepKind::Task, Some("Admin"), Some(72)),
                step("S4", "Evaluation", StepKind::Task, Some("Faculty"), Some(168)),
                step("S5", "Result Publish", StepKind::Notification, None, None),
            ],
        },
        Workflow {
            id: "WF003".to_string(),
            name: "Assignment Submission".to_string(),
            description: "Workflow for assignment submission and grading".to_string(),
            status: WorkflowStatus::Active,
            steps: vec![
                step("S1", "Student Submit", StepKind::Task, None, None),
                step("S2", "Plagiarism Check", StepKind::Task, None, Some(24)),
                step("S3", "Faculty Review", StepKind::Approval, Some("Faculty"), Some(72)),
                step("S4", "Grade Entry", StepKind::Task, Some("Faculty"), None),
                step("S5", "Notification", StepKind::Notification, None, None),
            ],
        },
    ]
}

fn announcements() -> Vec<Announcement> {
    vec![
        Announcement {
            id: "ANN001".to_string(),
            title: "Mid-Semester Examination Schedule".to_string(),
            content: "The mid-semester examinations will commence from March 1, 2026. Please check your individual schedules in the student portal.".to_string(),
            target: AnnouncementTarget::Students,
            priority: Priority::High,
            published_at: at(2026, 2, 10, 9, 0),
            author: "Dr. Arijit Sen".to_string(),
        },
        Announcement {
            id: "ANN002".to_string(),
            title: "Faculty Development Program".to_string(),
            content: "A faculty development program on \"Modern Teaching Methodologies\" will be held on Feb 20, 2026. All faculty members are encouraged to attend.".to_string(),
            target: AnnouncementTarget::Faculty,
            priority: Priority::Medium,
            published_at: at(2026, 2, 9, 14, 0),
            author: "Admin Office".to_string(),
        },
        Announcement {
            id: "ANN003".to_string(),
            title: "System Maintenance Notice".to_string(),
            content: "The platform will be under maintenance on Feb 18, 2026, from 2:00 AM to 6:00 AM. Please save your work accordingly.".to_string(),
            target: AnnouncementTarget::All,
            priority: Priority::High,
            published_at: at(2026, 2, 8, 10, 0),
            author: "IT Support".to_string(),
        },
    ]
}

fn stats() -> SystemStats {
    SystemStats {
        total_users: 3247,
        active_students: 2850,
        active_faculty: 312,
        admin_staff: 85,
        active_workflows: 156,
        pending_approvals: 43,
        system_health: 98.5,
        uptime: "99.9%".to_string(),
        cpu_usage: 42,
        memory_usage: 68,
        disk_usage: 54,
    }
}

fn activity(id: &str, user: &str, action: &str, target: &str, timestamp: NaiveDateTime) -> Activity {
    Activity {
        id: id.to_string(),
        user: user.to_string(),
        action: action.to_string(),
        target: target.to_string(),
        timestamp,
    }
}

fn activities() -> Vec<Activity> {
    vec![
        activity(
            "ACT001",
            "Ankit Sarkar",
            "Submitted assignment",
            "Binary Search Tree Implementation",
            at(2026, 2, 13, 10, 30),
        ),
        activity(
            "ACT002",
            "Dr. Debrup Das",
            "Graded assignment",
            "Network Protocol Analysis",
            at(2026, 2, 13, 9, 15),
        ),
        activity(
            "ACT003",
            "Arijit Sen",
            "Published announcement",
            "Mid-Semester Examination Schedule",
            at(2026, 2, 13, 8, 0),
        ),
        activity(
            "ACT004",
            "Emma Wilson",
            "Applied for leave",
            "Medical Leave - Feb 15-16",
            at(2026, 2, 12, 16, 45),
        ),
    ]
}

fn alerts() -> Vec<SystemAlert> {
    vec![
        SystemAlert {
            id: "ALERT001".to_string(),
            kind: AlertKind::Warning,
            message: "High CPU usage detected on server node 3".to_string(),
            timestamp: at(2026, 2, 13, 11, 0),
        },
        SystemAlert {
            id: "ALERT002".to_string(),
            kind: AlertKind::Info,
            message: "Scheduled maintenance in 48 hours".to_string(),
            timestamp: at(2026, 2, 13, 10, 0),
        },
        SystemAlert {
            id: "ALERT003".to_string(),
            kind: AlertKind::Error,
            message: "Database backup failed on secondary node".to_string(),
            timestamp: at(2026, 2, 12, 23, 30),
        },
    ]
}

fn pending_reviews() -> Vec<PendingReview> {
    [
        ("REV001", "John Smith", "Binary Search Tree Implementation", "Data Structures", at(2026, 2, 9, 18, 30)),
        ("REV002", "Emma Wilson", "SQL Queries Assignment", "Database Systems", at(2026, 2, 8, 14, 20)),
        ("REV003", "Michael Brown", "Network Protocol Analysis", "Computer Networks", at(2026, 2, 7, 20, 15)),
    ]
    .into_iter()
    .map(|(id, student, assignment, course, submitted_at)| PendingReview {
        id: id.to_string(),
        student_name: student.to_string(),
        assignment_title: assignment.to_string(),
        course_name: course.to_string(),
        submitted_at,
        deadline: at(2026, 2, 10, 23, 59),
    })
    .collect()
}

fn faculty_tasks() -> Vec<FacultyTask> {
    vec![
        FacultyTask {
            id: "TASK001".to_string(),
            title: "Review Assignment Submissions".to_string(),
            description: "Review pending assignments for Data Structures course".to_string(),
            priority: Priority::High,
            due_date: day(2026, 2, 14),
            completed: false,
        },
        FacultyTask {
            id: "TASK002".to_string(),
            title: "Prepare Lecture Slides".to_string(),
            description: "Prepare slides for next week's Database Systems lecture".to_string(),
            priority: Priority::Medium,
            due_date: day(2026, 2, 16),
            completed: false,
        },
        FacultyTask {
            id: "TASK003".to_string(),
            title: "Submit Attendance Report".to_string(),
            description: "Submit monthly attendance report for all courses".to_string(),
            priority: Priority::High,
            due_date: day(2026, 2, 15),
            completed: true,
        },
    ]
}
