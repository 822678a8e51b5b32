use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::test::{TestRequest, call_service, init_service, read_body_json};
use actix_web::{App, web};
use chrono::Utc;
use lingua_school::cache::ObjectCache;
use lingua_school::cache::object_cache::moka::MokaCacheWrapper;
use lingua_school::models::courses::entities::Course;
use lingua_school::models::courses::requests::CreateCourseRequest;
use lingua_school::models::exams::entities::{Exam, Question, QuestionKind};
use lingua_school::models::exams::requests::{CreateExamRequest, QuestionInput};
use lingua_school::models::users::entities::{User, UserRole};
use lingua_school::models::users::requests::CreateUserRequest;
use lingua_school::routes;
use lingua_school::storage::Storage;
use lingua_school::storage::sea_orm_storage::SeaOrmStorage;
use lingua_school::utils::password::hash_password;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};

struct School {
    storage: Arc<dyn Storage>,
    cache: Arc<dyn ObjectCache>,
    teacher: User,
    student: User,
    course: Course,
    exam: Exam,
    questions: Vec<Question>,
}

async fn user(storage: &Arc<dyn Storage>, name: &str, role: UserRole) -> User {
    storage
        .create_user(CreateUserRequest {
            username: name.to_string(),
            email: format!("{name}@lingua.test"),
            password: hash_password("s3cret-pass").unwrap(),
            role,
            display_name: None,
            avatar_url: None,
        })
        .await
        .unwrap()
}

fn question(prompt: &str, required: bool) -> QuestionInput {
    QuestionInput {
        section: None,
        kind: QuestionKind::FreeText,
        prompt: prompt.to_string(),
        options: None,
        correct_option: None,
        points: Some(5.0),
        required: Some(required),
    }
}

// 已发布的考试，两道必答题，学生已选课
async fn school() -> School {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::from_connection(db).await.unwrap());
    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new().unwrap());

    let teacher = user(&storage, "teacher", UserRole::Teacher).await;
    let student = user(&storage, "student", UserRole::Student).await;
    let course = storage
        .create_course(CreateCourseRequest {
            name: "Spanish B1".to_string(),
            language: "Spanish".to_string(),
            level: "B1".to_string(),
            description: None,
            schedule: None,
            capacity: Some(10),
            teacher_id: Some(teacher.id),
        })
        .await
        .unwrap();
    storage.enroll_student(course.id, student.id).await.unwrap();

    let exam = storage
        .create_exam(
            course.id,
            teacher.id,
            CreateExamRequest {
                title: "Writing".to_string(),
                description: None,
                duration_minutes: 20,
                max_score: Some(10.0),
                available_from: None,
                available_until: None,
                require_all_answered: Some(true),
                proctoring_enabled: Some(false),
                questions: None,
            },
        )
        .await
        .unwrap();
    let questions = storage
        .replace_exam_questions(
            exam.id,
            vec![question("Describe tu casa", true), question("¿Qué hiciste ayer?", true)],
        )
        .await
        .unwrap();
    let exam = storage.set_exam_published(exam.id, true).await.unwrap().unwrap();

    School {
        storage,
        cache,
        teacher,
        student,
        course,
        exam,
        questions,
    }
}

fn bearer(user: &User) -> (&'static str, String) {
    let pair = user.generate_token_pair(false).unwrap();
    ("Authorization", format!("Bearer {}", pair.access_token))
}

impl School {
    fn exam_path(&self, tail: &str) -> String {
        format!(
            "/api/v1/courses/{}/exams/{}{}",
            self.course.id, self.exam.id, tail
        )
    }
}

macro_rules! app {
    ($school:expr) => {
        init_service(
            App::new()
                .app_data(web::Data::new($school.storage.clone()))
                .app_data(web::Data::new($school.cache.clone()))
                .configure(routes::configure_auth_routes)
                .configure(routes::configure_course_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn submit_with_unanswered_required_questions_is_rejected() {
    let school = school().await;
    let app = app!(school);

    let req = TestRequest::post()
        .uri(&school.exam_path("/session/start"))
        .insert_header(bearer(&school.student))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let first = school.questions[0].id;
    let req = TestRequest::post()
        .uri(&school.exam_path("/session/submit"))
        .insert_header(bearer(&school.student))
        .set_json(json!({ "answers": { (first.to_string()): "Mi casa es pequeña" } }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = read_body_json(resp).await;
    assert_eq!(body["data"]["unanswered"], json!([school.questions[1].id]));

    // 被拒绝的提交不会结束作答，也不会写入答案
    let attempt = school
        .storage
        .get_exam_submission(school.exam.id, school.student.id)
        .await
        .unwrap()
        .unwrap();
    assert!(attempt.status.is_open());
    assert!(attempt.answers.is_empty());
}

#[actix_web::test]
async fn reading_expired_attempt_auto_submits_draft() {
    let school = school().await;
    let app = app!(school);

    let started = Utc::now() - chrono::Duration::hours(1);
    let attempt = school
        .storage
        .create_exam_submission(
            school.exam.id,
            school.student.id,
            started,
            started + chrono::Duration::minutes(20),
        )
        .await
        .unwrap();
    let first = school.questions[0].id;
    school
        .storage
        .merge_exam_answers(attempt.id, HashMap::from([(first, "borrador".to_string())]))
        .await
        .unwrap()
        .unwrap();

    let req = TestRequest::get()
        .uri(&school.exam_path("/session"))
        .insert_header(bearer(&school.student))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = read_body_json(resp).await;
    let submission = &body["data"]["submission"];
    assert_eq!(submission["status"], "auto_submitted");
    assert_eq!(submission["answers"][first.to_string()], "borrador");
    assert_eq!(body["data"]["remaining_seconds"], 0);

    let stored = school
        .storage
        .get_exam_submission_by_id(attempt.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.status.is_open());
    assert!(stored.submitted_at.is_some());
}

#[actix_web::test]
async fn exam_routes_enforce_course_roles() {
    let school = school().await;
    let app = app!(school);

    let req = TestRequest::get()
        .uri(&school.exam_path("/submissions"))
        .insert_header(bearer(&school.student))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::post()
        .uri(&school.exam_path("/session/start"))
        .insert_header(bearer(&school.teacher))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::get()
        .uri(&school.exam_path("/submissions"))
        .insert_header(bearer(&school.teacher))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri(&school.exam_path("/session"))
        .to_request();
    assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_sets_refresh_cookie() {
    let school = school().await;
    let app = app!(school);

    let req = TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr("10.0.0.7:5000".parse().unwrap())
        .set_json(json!({ "username": "student", "password": "s3cret-pass" }))
        .to_request();
    let resp = call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.response()
            .cookies()
            .any(|c| c.name() == "refresh_token" && !c.value().is_empty())
    );

    let body: Value = read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["id"], school.student.id);
    assert!(body["data"]["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}
