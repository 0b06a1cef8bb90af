// Résumé extraction prompt. `{resume_text}` is replaced with the document text.

pub const RESUME_EXTRACT_SYSTEM: &str = crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const RESUME_EXTRACT_PROMPT: &str = r#"아래 이력서 텍스트에서 학생 정보를 추출해 JSON 객체 하나로만 답하세요.

이력서 텍스트:
{resume_text}

출력 형식 (모든 값은 문자열):
{
  "name": "이름",
  "major": "학과 또는 전공, 예: 컴퓨터공학과",
  "grade": "텍스트에 적힌 학년 그대로, 예: 3학년",
  "graduation_year": "졸업(예정)년도 YYYY",
  "certificates": "자격증 이름을 쉼표로 구분, 예: 정보처리기사, SQLD",
  "field": "프로젝트와 경험으로 본 대표 분야를 짧게, 예: 백엔드 개발"
}

규칙:
- 텍스트에 없는 정보는 빈 문자열 ""로 둡니다.
- 학년을 직접 계산하지 말고, 적힌 학년과 졸업년도만 옮겨 적습니다.
- 분야를 판단할 근거가 부족하면 ""로 둡니다."#;
