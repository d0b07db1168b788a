mod matlab;
