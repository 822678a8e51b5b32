use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id_col(Users::Id))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::AvatarUrl).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(id_col(Courses::Id))
                    .col(
                        ColumnDef::new(Courses::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Courses::Name).string().not_null())
                    .col(ColumnDef::new(Courses::Language).string().not_null())
                    .col(ColumnDef::new(Courses::Level).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().null())
                    .col(ColumnDef::new(Courses::Schedule).string().null())
                    .col(ColumnDef::new(Courses::Capacity).integer().null())
                    .col(ColumnDef::new(Courses::TeacherId).big_integer().null())
                    .col(ColumnDef::new(Courses::Status).string().not_null())
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Courses::Table, Courses::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建课程分配表（教师/助教）
        manager
            .create_table(
                Table::create()
                    .table(CourseAssignments::Table)
                    .if_not_exists()
                    .col(id_col(CourseAssignments::Id))
                    .col(
                        ColumnDef::new(CourseAssignments::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseAssignments::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CourseAssignments::Role).string().not_null())
                    .col(
                        ColumnDef::new(CourseAssignments::AssignedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseAssignments::Table, CourseAssignments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseAssignments::Table, CourseAssignments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建选课表
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(id_col(Enrollments::Id))
                    .col(ColumnDef::new(Enrollments::CourseId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Enrollments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enrollments::Status).string().not_null())
                    .col(
                        ColumnDef::new(Enrollments::EnrolledAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建课时表
        manager
            .create_table(
                Table::create()
                    .table(Lessons::Table)
                    .if_not_exists()
                    .col(id_col(Lessons::Id))
                    .col(ColumnDef::new(Lessons::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::Title).string().not_null())
                    .col(ColumnDef::new(Lessons::Content).text().null())
                    .col(ColumnDef::new(Lessons::Position).integer().not_null())
                    .col(ColumnDef::new(Lessons::ScheduledAt).big_integer().null())
                    .col(ColumnDef::new(Lessons::Attachments).text().not_null())
                    .col(ColumnDef::new(Lessons::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Lessons::Table, Lessons::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考试表
        manager
            .create_table(
                Table::create()
                    .table(Exams::Table)
                    .if_not_exists()
                    .col(id_col(Exams::Id))
                    .col(ColumnDef::new(Exams::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Exams::Title).string().not_null())
                    .col(ColumnDef::new(Exams::Description).text().null())
                    .col(ColumnDef::new(Exams::DurationMinutes).integer().not_null())
                    .col(ColumnDef::new(Exams::MaxScore).double().not_null())
                    .col(ColumnDef::new(Exams::AvailableFrom).big_integer().null())
                    .col(ColumnDef::new(Exams::AvailableUntil).big_integer().null())
                    .col(
                        ColumnDef::new(Exams::RequireAllAnswered)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exams::ProctoringEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Exams::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Exams::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Exams::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Exams::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Exams::Table, Exams::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考试题目表
        manager
            .create_table(
                Table::create()
                    .table(ExamQuestions::Table)
                    .if_not_exists()
                    .col(id_col(ExamQuestions::Id))
                    .col(ColumnDef::new(ExamQuestions::ExamId).big_integer().not_null())
                    .col(ColumnDef::new(ExamQuestions::Section).string().not_null())
                    .col(ColumnDef::new(ExamQuestions::Position).integer().not_null())
                    .col(ColumnDef::new(ExamQuestions::Kind).string().not_null())
                    .col(ColumnDef::new(ExamQuestions::Prompt).text().not_null())
                    .col(ColumnDef::new(ExamQuestions::Options).text().not_null())
                    .col(ColumnDef::new(ExamQuestions::CorrectOption).integer().null())
                    .col(ColumnDef::new(ExamQuestions::Points).double().not_null())
                    .col(
                        ColumnDef::new(ExamQuestions::Required)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamQuestions::Table, ExamQuestions::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考试作答表
        manager
            .create_table(
                Table::create()
                    .table(ExamSubmissions::Table)
                    .if_not_exists()
                    .col(id_col(ExamSubmissions::Id))
                    .col(
                        ColumnDef::new(ExamSubmissions::ExamId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExamSubmissions::Status).string().not_null())
                    .col(
                        ColumnDef::new(ExamSubmissions::StartedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::DeadlineAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::SubmittedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::ElapsedSeconds)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ExamSubmissions::Answers).text().not_null())
                    .col(ColumnDef::new(ExamSubmissions::Warnings).text().not_null())
                    .col(ColumnDef::new(ExamSubmissions::AutoScore).double().null())
                    .col(ColumnDef::new(ExamSubmissions::Score).double().null())
                    .col(ColumnDef::new(ExamSubmissions::Feedback).text().null())
                    .col(
                        ColumnDef::new(ExamSubmissions::RecordingToken)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(ExamSubmissions::GradedBy).big_integer().null())
                    .col(ColumnDef::new(ExamSubmissions::GradedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamSubmissions::Table, ExamSubmissions::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamSubmissions::Table, ExamSubmissions::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建成绩表
        manager
            .create_table(
                Table::create()
                    .table(GradeRecords::Table)
                    .if_not_exists()
                    .col(id_col(GradeRecords::Id))
                    .col(ColumnDef::new(GradeRecords::CourseId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GradeRecords::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeRecords::ExamId).big_integer().null())
                    .col(ColumnDef::new(GradeRecords::Title).string().not_null())
                    .col(ColumnDef::new(GradeRecords::Category).string().not_null())
                    .col(ColumnDef::new(GradeRecords::Score).double().not_null())
                    .col(ColumnDef::new(GradeRecords::MaxScore).double().not_null())
                    .col(ColumnDef::new(GradeRecords::Weight).double().not_null())
                    .col(ColumnDef::new(GradeRecords::Comment).text().null())
                    .col(ColumnDef::new(GradeRecords::GradedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(GradeRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeRecords::Table, GradeRecords::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeRecords::Table, GradeRecords::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeRecords::Table, GradeRecords::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考勤表
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(id_col(AttendanceRecords::Id))
                    .col(
                        ColumnDef::new(AttendanceRecords::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::LessonId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::SessionDate)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::Status).string().not_null())
                    .col(ColumnDef::new(AttendanceRecords::Note).text().null())
                    .col(
                        ColumnDef::new(AttendanceRecords::RecordedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 PQR 工单表
        manager
            .create_table(
                Table::create()
                    .table(Pqrs::Table)
                    .if_not_exists()
                    .col(id_col(Pqrs::Id))
                    .col(ColumnDef::new(Pqrs::RequesterId).big_integer().not_null())
                    .col(ColumnDef::new(Pqrs::CourseId).big_integer().null())
                    .col(ColumnDef::new(Pqrs::AssigneeId).big_integer().null())
                    .col(ColumnDef::new(Pqrs::Kind).string().not_null())
                    .col(ColumnDef::new(Pqrs::Subject).string().not_null())
                    .col(ColumnDef::new(Pqrs::Description).text().not_null())
                    .col(ColumnDef::new(Pqrs::Status).string().not_null())
                    .col(ColumnDef::new(Pqrs::Response).text().null())
                    .col(ColumnDef::new(Pqrs::RespondedBy).big_integer().null())
                    .col(ColumnDef::new(Pqrs::RespondedAt).big_integer().null())
                    .col(ColumnDef::new(Pqrs::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Pqrs::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pqrs::Table, Pqrs::RequesterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pqrs::Table, Pqrs::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Pqrs::Table, Pqrs::AssigneeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建报告表
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(id_col(Reports::Id))
                    .col(ColumnDef::new(Reports::CourseId).big_integer().null())
                    .col(ColumnDef::new(Reports::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(Reports::Title).string().not_null())
                    .col(ColumnDef::new(Reports::Kind).string().not_null())
                    .col(ColumnDef::new(Reports::Content).text().not_null())
                    .col(ColumnDef::new(Reports::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Reports::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Reports::Table, Reports::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建文件表
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::DownloadToken)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::Bucket).string().not_null())
                    .col(ColumnDef::new(Files::OriginalName).string().not_null())
                    .col(ColumnDef::new(Files::StoredName).string().not_null())
                    .col(ColumnDef::new(Files::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Files::FileType).string().not_null())
                    .col(ColumnDef::new(Files::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Files::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一约束
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_course_assignments_course_user")
                    .table(CourseAssignments::Table)
                    .col(CourseAssignments::CourseId)
                    .col(CourseAssignments::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_enrollments_course_student")
                    .table(Enrollments::Table)
                    .col(Enrollments::CourseId)
                    .col(Enrollments::StudentId)
                    .to_owned(),
            )
            .await?;

        // 每个学生每场考试只能有一次作答
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_exam_submissions_exam_student")
                    .table(ExamSubmissions::Table)
                    .col(ExamSubmissions::ExamId)
                    .col(ExamSubmissions::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_attendance_course_student_date")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::CourseId)
                    .col(AttendanceRecords::StudentId)
                    .col(AttendanceRecords::SessionDate)
                    .to_owned(),
            )
            .await?;

        // 普通索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lessons_course_position")
                    .table(Lessons::Table)
                    .col(Lessons::CourseId)
                    .col(Lessons::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exams_course_id")
                    .table(Exams::Table)
                    .col(Exams::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exam_questions_exam_id")
                    .table(ExamQuestions::Table)
                    .col(ExamQuestions::ExamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grade_records_course_student")
                    .table(GradeRecords::Table)
                    .col(GradeRecords::CourseId)
                    .col(GradeRecords::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pqrs_requester_id")
                    .table(Pqrs::Table)
                    .col(Pqrs::RequesterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pqrs_assignee_id")
                    .table(Pqrs::Table)
                    .col(Pqrs::AssigneeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_files_user_id")
                    .table(Files::Table)
                    .col(Files::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pqrs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExamSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExamQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lessons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    DisplayName,
    AvatarUrl,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    Code,
    Name,
    Language,
    Level,
    Description,
    Schedule,
    Capacity,
    TeacherId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CourseAssignments {
    #[sea_orm(iden = "course_assignments")]
    Table,
    Id,
    CourseId,
    UserId,
    Role,
    AssignedAt,
}

#[derive(DeriveIden)]
enum Enrollments {
    #[sea_orm(iden = "enrollments")]
    Table,
    Id,
    CourseId,
    StudentId,
    Status,
    EnrolledAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Lessons {
    #[sea_orm(iden = "lessons")]
    Table,
    Id,
    CourseId,
    Title,
    Content,
    Position,
    ScheduledAt,
    Attachments,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Exams {
    #[sea_orm(iden = "exams")]
    Table,
    Id,
    CourseId,
    Title,
    Description,
    DurationMinutes,
    MaxScore,
    AvailableFrom,
    AvailableUntil,
    RequireAllAnswered,
    ProctoringEnabled,
    Published,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExamQuestions {
    #[sea_orm(iden = "exam_questions")]
    Table,
    Id,
    ExamId,
    Section,
    Position,
    Kind,
    Prompt,
    Options,
    CorrectOption,
    Points,
    Required,
}

#[derive(DeriveIden)]
enum ExamSubmissions {
    #[sea_orm(iden = "exam_submissions")]
    Table,
    Id,
    ExamId,
    StudentId,
    Status,
    StartedAt,
    DeadlineAt,
    SubmittedAt,
    ElapsedSeconds,
    Answers,
    Warnings,
    AutoScore,
    Score,
    Feedback,
    RecordingToken,
    GradedBy,
    GradedAt,
}

#[derive(DeriveIden)]
enum GradeRecords {
    #[sea_orm(iden = "grade_records")]
    Table,
    Id,
    CourseId,
    StudentId,
    ExamId,
    Title,
    Category,
    Score,
    MaxScore,
    Weight,
    Comment,
    GradedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    #[sea_orm(iden = "attendance_records")]
    Table,
    Id,
    CourseId,
    LessonId,
    StudentId,
    SessionDate,
    Status,
    Note,
    RecordedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Pqrs {
    #[sea_orm(iden = "pqrs")]
    Table,
    Id,
    RequesterId,
    CourseId,
    AssigneeId,
    Kind,
    Subject,
    Description,
    Status,
    Response,
    RespondedBy,
    RespondedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Reports {
    #[sea_orm(iden = "reports")]
    Table,
    Id,
    CourseId,
    AuthorId,
    Title,
    Kind,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Files {
    #[sea_orm(iden = "files")]
    Table,
    DownloadToken,
    Bucket,
    OriginalName,
    StoredName,
    FileSize,
    FileType,
    UserId,
    CreatedAt,
}
