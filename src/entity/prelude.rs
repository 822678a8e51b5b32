//! 预导入模块，方便使用

pub use super::attendance_records::{
    ActiveModel as AttendanceActiveModel, Entity as AttendanceRecords, Model as AttendanceModel,
};
pub use super::course_assignments::{
    ActiveModel as AssignmentActiveModel, Entity as CourseAssignments, Model as AssignmentModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as Enrollments, Model as EnrollmentModel,
};
pub use super::exam_questions::{
    ActiveModel as QuestionActiveModel, Entity as ExamQuestions, Model as QuestionModel,
};
pub use super::exam_submissions::{
    ActiveModel as ExamSubmissionActiveModel, Entity as ExamSubmissions,
    Model as ExamSubmissionModel,
};
pub use super::exams::{ActiveModel as ExamActiveModel, Entity as Exams, Model as ExamModel};
pub use super::files::{ActiveModel as FileActiveModel, Entity as Files, Model as FileModel};
pub use super::grade_records::{
    ActiveModel as GradeActiveModel, Entity as GradeRecords, Model as GradeModel,
};
pub use super::lessons::{ActiveModel as LessonActiveModel, Entity as Lessons, Model as LessonModel};
pub use super::pqrs::{ActiveModel as PqrActiveModel, Entity as Pqrs, Model as PqrModel};
pub use super::reports::{ActiveModel as ReportActiveModel, Entity as Reports, Model as ReportModel};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
